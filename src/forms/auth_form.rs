//! Sign-in and two-step sign-up forms

use super::validation::{finish, not_blank, only_fields, rule, validate_password};
use crate::error::AppResult;
use crate::models::{ProfileUpdate, ReferenceData};
use crate::services::{AuthService, AuthState, UserService};
use tracing::{info, warn};
use validator::{Validate, ValidationErrors};

#[derive(Debug, Clone, Default, Validate)]
pub struct SignInForm {
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[validate(custom(function = not_blank))]
    pub password: String,
}

impl SignInForm {
    pub async fn submit(&self, auth: &AuthService) -> AppResult<AuthState> {
        self.validate()?;
        Ok(auth.sign_in(self.email.trim(), &self.password).await?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignUpStep {
    #[default]
    Credentials,
    Profile,
    Done,
}

const CREDENTIAL_FIELDS: &[&str] = &["email", "password", "confirm_password"];
const PROFILE_FIELDS: &[&str] = &["display_name", "city", "school"];

#[derive(Debug, Clone, Default, Validate)]
pub struct SignUpForm {
    step: SignUpStep,
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[validate(custom(function = validate_password))]
    pub password: String,
    pub confirm_password: String,
    #[validate(
        custom(function = not_blank),
        length(min = 2, max = 50, message = "Name must be 2 to 50 characters.")
    )]
    pub display_name: String,
    #[validate(custom(function = not_blank))]
    pub city: String,
    /// Optional
    pub school: String,
}

impl SignUpForm {
    pub fn step(&self) -> SignUpStep {
        self.step
    }

    fn derived_errors(&self, fields: &[&'static str]) -> ValidationErrors {
        match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(all) => only_fields(&all, fields),
        }
    }

    fn validate_credentials(&self) -> Result<(), ValidationErrors> {
        let mut errors = self.derived_errors(CREDENTIAL_FIELDS);
        if self.password != self.confirm_password {
            errors.add(
                "confirm_password",
                rule("password_mismatch", "Passwords do not match."),
            );
        }
        finish(errors)
    }

    /// City and school must come from the reference lists when those loaded
    fn validate_profile(&self, reference: &ReferenceData) -> Result<(), ValidationErrors> {
        let mut errors = self.derived_errors(PROFILE_FIELDS);
        if !self.city.trim().is_empty()
            && !reference.cities.is_empty()
            && !reference.has_city(&self.city)
        {
            errors.add("city", rule("unknown_city", "Pick a city from the list."));
        }
        if !self.school.trim().is_empty()
            && !reference.schools.is_empty()
            && !reference
                .schools_in(&self.city)
                .iter()
                .any(|s| s.name == self.school)
        {
            errors.add(
                "school",
                rule("unknown_school", "Pick a school in the selected city."),
            );
        }
        finish(errors)
    }

    /// Validates the current step and moves to the next one
    pub fn advance(&mut self, reference: &ReferenceData) -> Result<SignUpStep, ValidationErrors> {
        match self.step {
            SignUpStep::Credentials => {
                self.validate_credentials()?;
                self.step = SignUpStep::Profile;
            }
            SignUpStep::Profile => {
                self.validate_profile(reference)?;
            }
            SignUpStep::Done => {}
        }
        Ok(self.step)
    }

    pub fn back(&mut self) {
        if self.step == SignUpStep::Profile {
            self.step = SignUpStep::Credentials;
        }
    }

    /// Registers the account, then stores city/school on the profile.
    ///
    /// The profile update is best effort; the account exists either way.
    pub async fn submit(
        &mut self,
        reference: &ReferenceData,
        auth: &AuthService,
        users: &UserService,
    ) -> AppResult<AuthState> {
        self.validate_credentials()?;
        self.validate_profile(reference)?;

        let state = auth
            .sign_up(self.email.trim(), &self.password, self.display_name.trim())
            .await?;

        if let AuthState::SignedIn { user_id, .. } = &state {
            let update = ProfileUpdate {
                display_name: Some(self.display_name.trim().to_string()),
                city: Some(self.city.clone()),
                school: Some(self.school.clone()).filter(|s| !s.trim().is_empty()),
            };
            if let Err(e) = users.update_profile(user_id, &update).await {
                warn!("⚠️ Profile details not saved for {}: {}", user_id, e);
            }
        }

        self.step = SignUpStep::Done;
        info!("✓ Sign-up completed for {}", self.email.trim());
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::validation::field_messages;
    use crate::models::{City, School};

    fn reference() -> ReferenceData {
        ReferenceData {
            cities: vec![City {
                name: "Niš".to_string(),
            }],
            schools: vec![School {
                name: "Gimnazija Svetozar Marković".to_string(),
                city: "Niš".to_string(),
            }],
        }
    }

    fn filled() -> SignUpForm {
        SignUpForm {
            email: "marko@example.rs".to_string(),
            password: "Lozinka123".to_string(),
            confirm_password: "Lozinka123".to_string(),
            display_name: "Marko".to_string(),
            city: "Niš".to_string(),
            ..SignUpForm::default()
        }
    }

    #[test]
    fn credentials_step_blocks_on_mismatch() {
        let mut form = SignUpForm {
            confirm_password: "Drugacija123".to_string(),
            ..filled()
        };
        let errors = form.advance(&reference()).unwrap_err();
        assert_eq!(
            field_messages(&errors, "confirm_password"),
            vec!["Passwords do not match.".to_string()]
        );
        assert!(field_messages(&errors, "display_name").is_empty());
        assert_eq!(form.step(), SignUpStep::Credentials);
    }

    #[test]
    fn wizard_moves_forward_and_back() {
        let mut form = filled();
        assert_eq!(form.advance(&reference()).unwrap(), SignUpStep::Profile);
        form.back();
        assert_eq!(form.step(), SignUpStep::Credentials);
    }

    #[test]
    fn school_must_belong_to_city() {
        let mut form = SignUpForm {
            school: "Zemunska gimnazija".to_string(),
            ..filled()
        };
        form.advance(&reference()).unwrap();
        let errors = form.advance(&reference()).unwrap_err();
        assert_eq!(field_messages(&errors, "school").len(), 1);

        form.school = "Gimnazija Svetozar Marković".to_string();
        assert!(form.advance(&reference()).is_ok());
    }

    #[test]
    fn sign_in_requires_both_fields() {
        let form = SignInForm::default();
        let errors = form.validate().unwrap_err();
        assert_eq!(
            field_messages(&errors, "email"),
            vec!["Enter a valid email address.".to_string()]
        );
        assert_eq!(
            field_messages(&errors, "password"),
            vec!["This field is required.".to_string()]
        );
    }

    #[test]
    fn weak_password_blocks_credentials_step() {
        let mut form = SignUpForm {
            password: "lozinka".to_string(),
            confirm_password: "lozinka".to_string(),
            ..filled()
        };
        let errors = form.advance(&reference()).unwrap_err();
        assert_eq!(
            field_messages(&errors, "password"),
            vec!["Use at least 8 characters, an upper-case letter, a digit.".to_string()]
        );
        assert_eq!(form.step(), SignUpStep::Credentials);
    }

    #[test]
    fn profile_step_checks_name_length_and_known_city() {
        let mut form = SignUpForm {
            display_name: "M".to_string(),
            city: "Atlantida".to_string(),
            ..filled()
        };
        form.advance(&reference()).unwrap();
        let errors = form.advance(&reference()).unwrap_err();
        assert_eq!(
            field_messages(&errors, "display_name"),
            vec!["Name must be 2 to 50 characters.".to_string()]
        );
        assert_eq!(
            field_messages(&errors, "city"),
            vec!["Pick a city from the list.".to_string()]
        );
    }

    #[test]
    fn malformed_email_is_rejected() {
        let form = SignInForm {
            email: "ana@".to_string(),
            password: "x".to_string(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(field_messages(&errors, "email").len(), 1);
        assert!(field_messages(&errors, "password").is_empty());
    }
}

//! Field rules shared by the `#[derive(Validate)]` form structs
//!
//! The derive covers per-field checks; the forms add the cross-field ones
//! (matching passwords, reference-data lookups) with `ValidationErrors::add`.

use std::borrow::Cow;
use validator::{ValidationError, ValidationErrors};

pub const MIN_PASSWORD_LEN: usize = 8;

/// Error with a user-facing message
pub fn rule(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

/// Rejects empty and whitespace-only values
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(rule("required", "This field is required."));
    }
    Ok(())
}

/// At least 8 characters with an upper-case letter, a lower-case letter and a digit.
///
/// Every missing rule ends up in the message.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    not_blank(password)?;

    let mut missing = Vec::new();
    if password.chars().count() < MIN_PASSWORD_LEN {
        missing.push(format!("at least {MIN_PASSWORD_LEN} characters"));
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        missing.push("an upper-case letter".to_string());
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        missing.push("a lower-case letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        missing.push("a digit".to_string());
    }
    if missing.is_empty() {
        return Ok(());
    }

    Err(rule("weak_password", format!("Use {}.", missing.join(", "))))
}

/// `Ok` when nothing was collected
pub fn finish(errors: ValidationErrors) -> Result<(), ValidationErrors> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// The subset of `errors` that belongs to `fields`
pub fn only_fields(errors: &ValidationErrors, fields: &[&'static str]) -> ValidationErrors {
    let by_field = errors.field_errors();
    let mut subset = ValidationErrors::new();
    for &field in fields {
        for error in by_field.get(field).into_iter().flat_map(|list| list.iter()) {
            subset.add(field, error.clone());
        }
    }
    subset
}

/// Messages recorded for `field`, falling back to the error code
pub fn field_messages(errors: &ValidationErrors, field: &str) -> Vec<String> {
    errors
        .field_errors()
        .get(field)
        .map(|list| {
            list.iter()
                .map(|e| match &e.message {
                    Some(message) => message.to_string(),
                    None => e.code.to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// One `field: message` line per problem, sorted by field
pub fn describe(errors: &ValidationErrors) -> String {
    let mut fields: Vec<String> = errors
        .field_errors()
        .keys()
        .map(|field| field.to_string())
        .collect();
    fields.sort();
    fields
        .iter()
        .flat_map(|field| {
            field_messages(errors, field)
                .into_iter()
                .map(move |message| format!("{field}: {message}"))
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_lists_every_missing_rule() {
        let error = validate_password("abc").unwrap_err();
        assert_eq!(error.code, "weak_password");
        assert_eq!(
            error.message.as_deref(),
            Some("Use at least 8 characters, an upper-case letter, a digit.")
        );
        assert!(validate_password("Lozinka123").is_ok());
    }

    #[test]
    fn blank_password_only_says_required() {
        let error = validate_password("   ").unwrap_err();
        assert_eq!(error.code, "required");
    }

    #[test]
    fn describe_joins_fields_in_order() {
        let mut errors = ValidationErrors::new();
        errors.add("password", rule("weak_password", "too short"));
        errors.add("email", rule("email", "invalid"));
        assert_eq!(describe(&errors), "email: invalid; password: too short");
        assert_eq!(field_messages(&errors, "email"), vec!["invalid".to_string()]);

        let subset = only_fields(&errors, &["email"]);
        assert_eq!(describe(&subset), "email: invalid");
        assert!(finish(errors).is_err());
        assert!(finish(ValidationErrors::new()).is_ok());
    }
}

//! Authentication
//!
//! Signs in against the identity provider, persists the id token for the REST
//! client and broadcasts auth-state changes to subscribers.

use super::UserService;
use crate::clients::{IdentityClient, IdentitySession};
use crate::error::{ApiErrorKind, AuthError};
use crate::models::{Role, UserProfile};
use crate::storage::TokenStore;
use tokio::sync::watch;
use tracing::{info, warn};

/// Who is using the client right now
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    SignedOut,
    SignedIn {
        user_id: String,
        email: String,
        display_name: Option<String>,
        role: Role,
    },
}

impl AuthState {
    pub fn is_signed_in(&self) -> bool {
        matches!(self, AuthState::SignedIn { .. })
    }

    pub fn is_admin(&self) -> bool {
        matches!(
            self,
            AuthState::SignedIn {
                role: Role::Admin,
                ..
            }
        )
    }

    fn from_profile(profile: UserProfile) -> Self {
        AuthState::SignedIn {
            user_id: profile.id,
            email: profile.email,
            display_name: profile.display_name,
            role: profile.role,
        }
    }
}

pub struct AuthService {
    identity: IdentityClient,
    tokens: TokenStore,
    users: UserService,
    state: watch::Sender<AuthState>,
}

impl AuthService {
    pub fn new(identity: IdentityClient, tokens: TokenStore, users: UserService) -> Self {
        let (state, _) = watch::channel(AuthState::SignedOut);
        Self {
            identity,
            tokens,
            users,
            state,
        }
    }

    /// Auth-state-changed subscription; the receiver starts at the current state
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn current(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Picks up a token persisted by an earlier run.
    ///
    /// A token the API rejects is dropped.
    pub async fn restore(&self) -> AuthState {
        if self.tokens.get().is_none() {
            return self.publish(AuthState::SignedOut);
        }
        match self.users.me().await {
            Ok(profile) => {
                info!("✓ Restored session for {}", profile.email);
                self.publish(AuthState::from_profile(profile))
            }
            Err(e) => {
                if e.kind() == ApiErrorKind::Unauthorized {
                    if let Err(clear_err) = self.tokens.clear() {
                        warn!("Could not clear stale token: {}", clear_err);
                    }
                }
                warn!("⚠️ Could not restore session: {}", e);
                self.publish(AuthState::SignedOut)
            }
        }
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<AuthState, AuthError> {
        let session = self.identity.sign_up(email, password).await?;
        self.identity
            .update_display_name(&session.id_token, display_name)
            .await?;
        info!("✓ Registered {}", email);
        let session = IdentitySession {
            display_name: Some(display_name.to_string()),
            ..session
        };
        self.establish(session).await
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthState, AuthError> {
        let session = self.identity.sign_in(email, password).await?;
        info!("✓ Signed in as {}", email);
        self.establish(session).await
    }

    pub fn sign_out(&self) -> Result<(), AuthError> {
        if !self.current().is_signed_in() {
            return Err(AuthError::NotSignedIn);
        }
        if let Err(e) = self.tokens.clear() {
            warn!("Could not remove persisted token: {}", e);
        }
        self.publish(AuthState::SignedOut);
        info!("Signed out");
        Ok(())
    }

    /// Persists the token, then asks the API for the role
    async fn establish(&self, session: IdentitySession) -> Result<AuthState, AuthError> {
        if let Err(e) = self.tokens.set(&session.id_token) {
            warn!("⚠️ Token not persisted, sign-in will not survive a restart: {}", e);
        }

        let state = match self.users.me().await {
            Ok(profile) => AuthState::from_profile(profile),
            Err(e) => {
                warn!("Profile lookup failed, assuming student role: {}", e);
                AuthState::SignedIn {
                    user_id: session.local_id,
                    email: session.email,
                    display_name: session.display_name,
                    role: Role::Student,
                }
            }
        };
        Ok(self.publish(state))
    }

    fn publish(&self, state: AuthState) -> AuthState {
        self.state.send_replace(state.clone());
        state
    }
}

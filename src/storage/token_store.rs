use super::LocalStore;
use crate::error::AppResult;
use tracing::warn;

pub const AUTH_TOKEN_KEY: &str = "authToken";

/// Bearer token persisted under `authToken`
#[derive(Clone, Debug)]
pub struct TokenStore {
    store: LocalStore,
}

impl TokenStore {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    /// Current token; a malformed entry counts as signed out
    pub fn get(&self) -> Option<String> {
        match self.store.get::<String>(AUTH_TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!("Ignoring unreadable auth token: {}", e);
                None
            }
        }
    }

    pub fn set(&self, token: &str) -> AppResult<()> {
        self.store.set(AUTH_TOKEN_KEY, &token)
    }

    pub fn clear(&self) -> AppResult<()> {
        self.store.remove(AUTH_TOKEN_KEY)
    }
}

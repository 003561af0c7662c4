/// Identity provider client
///
/// Email/password accounts over the provider's REST interface
/// (`accounts:signUp`, `accounts:signInWithPassword`, `accounts:update`).
use crate::config::Config;
use crate::error::{ApiError, AuthError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

/// Signed-in account as returned by the provider
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentitySession {
    pub id_token: String,
    pub email: String,
    pub local_id: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Clone, Debug)]
pub struct IdentityClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl IdentityClient {
    pub fn new(config: &Config) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ApiError::RequestFailed {
                endpoint: config.identity_base_url.clone(),
                source: e,
            })?;

        Ok(Self {
            client,
            base_url: config.identity_base_url.trim_end_matches('/').to_string(),
            api_key: config.firebase_api_key.clone(),
        })
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<IdentitySession, AuthError> {
        let body = Credentials {
            email,
            password,
            return_secure_token: true,
        };
        self.call("accounts:signUp", &body).await
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<IdentitySession, AuthError> {
        let body = Credentials {
            email,
            password,
            return_secure_token: true,
        };
        self.call("accounts:signInWithPassword", &body).await
    }

    /// Sets the display name on the account behind `id_token`
    pub async fn update_display_name(
        &self,
        id_token: &str,
        display_name: &str,
    ) -> Result<(), AuthError> {
        let body = json!({
            "idToken": id_token,
            "displayName": display_name,
            "returnSecureToken": false
        });
        let _: Value = self.call("accounts:update", &body).await?;
        Ok(())
    }

    async fn call<B: Serialize, T: serde::de::DeserializeOwned>(
        &self,
        action: &str,
        body: &B,
    ) -> Result<T, AuthError> {
        let url = format!("{}/{}?key={}", self.base_url, action, self.api_key);
        debug!("Identity request: {}", action);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| transport(action, e))?;
        let status = response.status();
        let value: Value = response.json().await.map_err(|e| transport(action, e))?;

        if !status.is_success() {
            return Err(rejection(&value).unwrap_or_else(|| {
                AuthError::Transport(ApiError::status(action, status.as_u16(), None))
            }));
        }

        serde_json::from_value(value).map_err(|e| {
            AuthError::Transport(ApiError::JsonParseFailed {
                endpoint: action.to_string(),
                source: e,
            })
        })
    }
}

fn transport(action: &str, e: reqwest::Error) -> AuthError {
    let api = if e.is_timeout() {
        ApiError::Timeout {
            endpoint: action.to_string(),
        }
    } else {
        ApiError::RequestFailed {
            endpoint: action.to_string(),
            source: e,
        }
    };
    AuthError::Transport(api)
}

/// `{"error": {"message": "EMAIL_EXISTS"}}` -> `Rejected { code }`
fn rejection(body: &Value) -> Option<AuthError> {
    body.get("error")
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .map(|code| AuthError::Rejected {
            code: code.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_code_becomes_rejection() {
        let body = json!({"error": {"code": 400, "message": "EMAIL_EXISTS"}});
        match rejection(&body) {
            Some(AuthError::Rejected { code }) => assert_eq!(code, "EMAIL_EXISTS"),
            other => panic!("unexpected: {:?}", other),
        }
        assert!(rejection(&json!({"status": "bad"})).is_none());
    }

    #[test]
    fn session_decodes_from_provider_payload() {
        let session: IdentitySession = serde_json::from_value(json!({
            "idToken": "tok",
            "email": "ana@example.rs",
            "localId": "uid-1",
            "refreshToken": "r",
            "expiresIn": "3600"
        }))
        .unwrap();
        assert_eq!(session.local_id, "uid-1");
        assert_eq!(session.display_name, None);
    }
}

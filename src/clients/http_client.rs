/// REST API client
///
/// The one configured request client every service shares. Attaches the
/// persisted bearer token on each request and maps non-2xx responses to
/// `ApiError::Status`.
use crate::config::Config;
use crate::error::ApiError;
use crate::storage::TokenStore;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

pub type ApiResult<T> = Result<T, ApiError>;

/// Shared REST client; cheap to clone
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
    tokens: TokenStore,
    verbose: bool,
}

impl HttpClient {
    /// Builds the client with the configured timeout
    pub fn new(config: &Config, tokens: TokenStore) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ApiError::RequestFailed {
                endpoint: config.api_base_url.clone(),
                source: e,
            })?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            tokens,
            verbose: config.verbose_logging,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<T> {
        self.send::<(), T>(Method::GET, endpoint, None).await
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.send(Method::POST, endpoint, Some(body)).await
    }

    /// POST without a body, e.g. `exams/:id/complete`
    pub async fn post_empty<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<T> {
        self.send::<(), T>(Method::POST, endpoint, None).await
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.send(Method::PUT, endpoint, Some(body)).await
    }

    pub async fn delete(&self, endpoint: &str) -> ApiResult<()> {
        let _: Value = self.send::<(), Value>(Method::DELETE, endpoint, None).await?;
        Ok(())
    }

    /// Sends one request and decodes the JSON response.
    ///
    /// An empty 2xx body decodes as JSON `null`.
    async fn send<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> ApiResult<T> {
        let url = self.url(endpoint);
        debug!("{} {}", method, url);

        let mut request = self.client.request(method, &url);
        if let Some(token) = self.tokens.get() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            if self.verbose {
                if let Ok(payload) = serde_json::to_string(body) {
                    debug!("Payload: {}", payload);
                }
            }
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(endpoint, e))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport_error(endpoint, e))?;

        if !status.is_success() {
            return Err(ApiError::status(
                endpoint,
                status.as_u16(),
                extract_message(&bytes),
            ));
        }

        let raw: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &bytes
        };
        serde_json::from_slice(raw).map_err(|e| ApiError::JsonParseFailed {
            endpoint: endpoint.to_string(),
            source: e,
        })
    }
}

fn transport_error(endpoint: &str, e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout {
            endpoint: endpoint.to_string(),
        }
    } else {
        ApiError::RequestFailed {
            endpoint: endpoint.to_string(),
            source: e,
        }
    }
}

/// `message` (or `error`) from a JSON error body, else the raw text
pub(crate) fn extract_message(body: &[u8]) -> Option<String> {
    if let Ok(value) = serde_json::from_slice::<Value>(body) {
        let field = value
            .get("message")
            .or_else(|| value.get("error"))
            .and_then(|v| v.as_str());
        if let Some(message) = field {
            return Some(message.to_string());
        }
    }
    let text = String::from_utf8_lossy(body).trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(crate::utils::logging::truncate_text(&text, 200))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalStore;

    #[test]
    fn message_is_taken_from_json_body() {
        assert_eq!(
            extract_message(br#"{"message":"Answer already exists"}"#).as_deref(),
            Some("Answer already exists")
        );
        assert_eq!(
            extract_message(br#"{"error":"Not Found"}"#).as_deref(),
            Some("Not Found")
        );
        assert_eq!(extract_message(b"Bad Gateway").as_deref(), Some("Bad Gateway"));
        assert_eq!(extract_message(b"  "), None);
    }

    #[test]
    fn endpoints_join_base_url_with_single_slash() {
        let config = Config {
            api_base_url: "https://api.example.rs/api/".to_string(),
            ..Config::default()
        };
        let client = HttpClient::new(&config, TokenStore::new(LocalStore::in_memory())).unwrap();
        assert_eq!(client.url("/exams/1"), "https://api.example.rs/api/exams/1");
        assert_eq!(client.url("user-answers/submit"), "https://api.example.rs/api/user-answers/submit");
    }
}

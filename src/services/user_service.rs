use super::ListResponse;
use crate::clients::{ApiResult, HttpClient};
use crate::models::{ProfileUpdate, UserProfile};

/// `users` resource
#[derive(Clone, Debug)]
pub struct UserService {
    http: HttpClient,
}

impl UserService {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Profile of the token's owner
    pub async fn me(&self) -> ApiResult<UserProfile> {
        self.http.get("users/me").await
    }

    pub async fn get(&self, user_id: &str) -> ApiResult<UserProfile> {
        self.http.get(&format!("users/{user_id}")).await
    }

    pub async fn update_profile(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> ApiResult<UserProfile> {
        self.http.put(&format!("users/{user_id}"), update).await
    }

    /// Admin only
    pub async fn list(&self) -> ApiResult<Vec<UserProfile>> {
        let users: ListResponse<UserProfile> = self.http.get("users").await?;
        Ok(users.into_vec())
    }
}

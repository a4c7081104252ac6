use reqwest::Method;

use super::{
    client::ApiClient,
    error::ApiError,
    types::{LoginRequest, RefreshRequest, RefreshedToken, RegisterRequest, TokenPair},
};

impl ApiClient {
    pub async fn obtain_token(&self, request: &LoginRequest) -> Result<TokenPair, ApiError> {
        self.send_json(Method::POST, "/token/", request).await
    }

    pub async fn refresh_token(&self, refresh: &str) -> Result<RefreshedToken, ApiError> {
        let payload = RefreshRequest {
            refresh: refresh.to_string(),
        };
        self.send_json(Method::POST, "/token/refresh/", &payload)
            .await
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError> {
        self.send_discarding(Method::POST, "/auth/register/", Some(request))
            .await
    }
}

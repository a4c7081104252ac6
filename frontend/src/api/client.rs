use std::{cell::RefCell, rc::Rc};

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};

use super::error::ApiError;
use crate::config::{self, ClientConfig};

/// HTTP transport shared by the session and every resource call.
///
/// Clones share the default `Authorization` header, so setting or clearing
/// it through one handle affects every request issued afterwards.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    bearer: Rc<RefCell<Option<String>>>,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::from_config(config::client_config())
    }
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            bearer: Rc::new(RefCell::new(None)),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.api_base_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_bearer_token(&self, token: &str) {
        *self.bearer.borrow_mut() = Some(token.to_string());
    }

    pub fn clear_bearer_token(&self) {
        self.bearer.borrow_mut().take();
    }

    pub fn bearer_token(&self) -> Option<String> {
        self.bearer.borrow().clone()
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self.client.request(method, self.endpoint(path));
        if let Some(token) = self.bearer.borrow().as_deref() {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Sends the request and turns any non-2xx status into an [`ApiError`].
    pub(crate) async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let url = response.url().path().to_string();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                log::warn!("Failed to read error body from {}: {}", url, err);
                String::new()
            }
        };
        let error = ApiError::from_status(status, &body);
        log::warn!("API error on {}: {}", url, error);
        Err(error)
    }

    pub(crate) async fn map_json_response<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> Result<T, ApiError> {
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {}", e)))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(self.request(Method::GET, path)).await?;
        self.map_json_response(response).await
    }

    pub(crate) async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(self.request(method, path).json(body)).await?;
        self.map_json_response(response).await
    }

    /// For endpoints whose reply body is irrelevant.
    pub(crate) async fn send_discarding<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        let mut builder = self.request(method, path);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.send(builder).await.map(|_| ())
    }
}

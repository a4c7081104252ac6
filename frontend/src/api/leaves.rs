use reqwest::Method;
use serde_json::json;

use super::{
    client::ApiClient,
    error::ApiError,
    types::{ApplyLeave, LeaveDecision, LeaveRequest},
};

impl ApiClient {
    pub async fn list_leaves(&self) -> Result<Vec<LeaveRequest>, ApiError> {
        self.get_json("/leaves/").await
    }

    pub async fn apply_leave(&self, request: &ApplyLeave) -> Result<LeaveRequest, ApiError> {
        self.send_json(Method::POST, "/leaves/", request).await
    }

    /// Staff only; anyone else gets [`ApiError::Forbidden`].
    pub async fn approve_leave(&self, id: &str) -> Result<LeaveDecision, ApiError> {
        self.decide_leave(id, "approve").await
    }

    pub async fn reject_leave(&self, id: &str) -> Result<LeaveDecision, ApiError> {
        self.decide_leave(id, "reject").await
    }

    async fn decide_leave(&self, id: &str, action: &str) -> Result<LeaveDecision, ApiError> {
        self.send_json(
            Method::PATCH,
            &format!("/leaves/{}/{}/", id, action),
            &json!({}),
        )
        .await
    }
}

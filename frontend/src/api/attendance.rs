use reqwest::Method;

use super::{
    client::ApiClient,
    error::ApiError,
    types::{AttendanceRecord, MarkAttendance},
};

impl ApiClient {
    /// Newest first. Staff see every employee, everyone else only themselves.
    pub async fn list_attendance(&self) -> Result<Vec<AttendanceRecord>, ApiError> {
        self.get_json("/attendance/").await
    }

    /// A second mark for the same employee and date comes back as
    /// [`ApiError::BadRequest`].
    pub async fn mark_attendance(
        &self,
        request: &MarkAttendance,
    ) -> Result<AttendanceRecord, ApiError> {
        self.send_json(Method::POST, "/attendance/", request).await
    }
}

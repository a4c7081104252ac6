use reqwest::Method;

use super::{
    client::ApiClient,
    error::ApiError,
    types::{Employee, NewEmployee},
};

fn employee_path(employee_id: &str) -> String {
    format!("/employees/{}/", employee_id)
}

impl ApiClient {
    pub async fn list_employees(&self) -> Result<Vec<Employee>, ApiError> {
        self.get_json("/employees/").await
    }

    pub async fn get_employee(&self, employee_id: &str) -> Result<Employee, ApiError> {
        self.get_json(&employee_path(employee_id)).await
    }

    pub async fn create_employee(&self, employee: &NewEmployee) -> Result<Employee, ApiError> {
        self.send_json(Method::POST, "/employees/", employee).await
    }

    pub async fn update_employee(
        &self,
        employee_id: &str,
        employee: &NewEmployee,
    ) -> Result<Employee, ApiError> {
        self.send_json(Method::PUT, &employee_path(employee_id), employee)
            .await
    }

    pub async fn delete_employee(&self, employee_id: &str) -> Result<(), ApiError> {
        self.send_discarding::<()>(Method::DELETE, &employee_path(employee_id), None)
            .await
    }
}

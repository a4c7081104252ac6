//! Session lifecycle for the HRMS client.
//!
//! [`SessionManager`] is the single owner of the logged-in identity and of
//! the three persisted entries behind it. Views read [`SessionState`] and
//! change it only through the manager's operations.

mod error;
mod identity;
mod manager;

pub use error::SessionError;
pub use identity::{Identity, Role};
pub use manager::SessionManager;

#[cfg(test)]
pub(crate) use identity::token_with_claims;

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const IDENTITY_KEY: &str = "user_data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub identity: Option<Identity>,
    /// True only until the startup restore has run.
    pub loading: bool,
    pub role: Role,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            identity: None,
            loading: true,
            role: Role::Unknown,
        }
    }
}

impl SessionState {
    pub fn logged_out() -> Self {
        Self {
            loading: false,
            ..Self::default()
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !self.loading && self.identity.is_some()
    }
}

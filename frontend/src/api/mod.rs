mod attendance;
mod auth;
pub mod client;
mod dashboard;
mod employees;
pub mod error;
mod leaves;
pub mod types;

pub use client::*;
pub use error::*;
pub use types::*;

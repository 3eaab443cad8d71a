pub mod analytics;
pub mod auth;
pub mod forecast;

pub use crate::utils::error::Result;

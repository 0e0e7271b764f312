//! HTTP request handlers

pub mod aliquots;
pub mod attributes;
pub mod error;
pub mod health;
pub mod participants;
pub mod samples;
pub mod specimens;

pub use error::{ApiError, ApiResult};

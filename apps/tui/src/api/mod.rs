pub mod client;
pub mod envelope;

pub use client::{ApiClient, ApiError};

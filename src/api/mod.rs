//! Dashboard API adapter: an authenticated HTTP client plus the retry
//! policy applied around individual calls.

pub mod client;
pub mod retry;
pub mod types;

pub use client::{ApiClient, ApiResponse, Auth};

//! Shared HTTP plumbing for the store and AI integrations.

mod client;

pub use client::{error_for_status, HttpClient, HttpClientBuilder};

//! External service integrations.

pub mod openai;
pub mod shopify;
pub mod tiktok;

//! OpenAI chat-completions integration (the enrichment collaborator).

mod client;
mod types;

pub use client::{DryRunEnrichment, OpenAiClient};

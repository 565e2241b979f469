use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;
use shoptok_core::ports::{EnrichedFields, EnrichmentClient};
use shoptok_domain::{OpenAiConfig, Product, Result, SyncError};
use tracing::{debug, info};

use super::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, EnrichmentReply};
use crate::http::{error_for_status, HttpClient};

const SERVICE: &str = "openai";
const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const MAX_TOKENS: u32 = 1000;
const TEMPERATURE: f32 = 0.7;
/// Cap on the description excerpt included in the prompt.
const DESCRIPTION_EXCERPT: usize = 500;
/// Variants beyond this are not interesting for metadata.
const PROMPT_VARIANT_LIMIT: usize = 3;

const SYSTEM_PROMPT: &str = "You are an expert at optimizing e-commerce products for TikTok Shop. \
Analyze the product data and provide an optimized TikTok title (max 100 chars, catchy), \
an optimized description (max 500 chars, engaging with trending hashtags), a product category, \
5 trending hashtags like #TikTokMadeMeBuyIt or #Aesthetic, and search keywords. \
Return valid JSON with keys: tiktok_title, tiktok_description, category, hashtags, keywords.";

/// Enrichment client backed by the OpenAI Chat Completions API.
pub struct OpenAiClient {
    http: HttpClient,
    api_key: String,
    model: String,
    api_url: String,
}

impl OpenAiClient {
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new()?,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            api_url: OPENAI_API_URL.to_string(),
        })
    }

    #[cfg(test)]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    fn build_prompt(product: &Product) -> String {
        let description: String = product.description.chars().take(DESCRIPTION_EXCERPT).collect();
        let summary = json!({
            "title": product.title,
            "description": description,
            "product_type": product.product_type,
            "vendor": product.vendor,
            "tags": product.tags,
            "variants": product
                .variants
                .iter()
                .take(PROMPT_VARIANT_LIMIT)
                .map(|v| json!({"title": v.title, "price": v.price}))
                .collect::<Vec<_>>(),
        });

        format!(
            "Optimize this product for TikTok Shop:\n\n{}\n\nProvide a TikTok-optimized title, \
             description with hashtags, category, trending hashtags, and keywords. Include \
             hashtags like #TikTokMadeMeBuyIt where relevant.",
            serde_json::to_string_pretty(&summary).unwrap_or_else(|_| summary.to_string()),
        )
    }
}

/// Models often wrap JSON answers in a markdown code fence.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    let without_open = match trimmed.find('\n') {
        Some(pos) => &trimmed[pos + 1..],
        None => return trimmed,
    };
    without_open.trim_end().trim_end_matches("```").trim()
}

#[async_trait]
impl EnrichmentClient for OpenAiClient {
    async fn enrich(&self, product: &Product) -> Result<EnrichedFields> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage { role: "system".to_string(), content: SYSTEM_PROMPT.to_string() },
                ChatMessage { role: "user".to_string(), content: Self::build_prompt(product) },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let builder = self
            .http
            .request(Method::POST, &self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request);

        let response = self.http.send(builder).await?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| SyncError::Network(format!("failed to read response body: {err}")))?;
        if !status.is_success() {
            return Err(error_for_status(SERVICE, status, &text));
        }

        let completion: ChatCompletionResponse = serde_json::from_str(&text).map_err(|err| {
            SyncError::InvalidResponse(format!("openai returned malformed JSON: {err}"))
        })?;
        let content = completion
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .ok_or_else(|| SyncError::InvalidResponse("openai response had no choices".into()))?;

        let payload = strip_code_fence(content);
        debug!(product = %product.id, "parsing enrichment reply");
        let reply: EnrichmentReply = serde_json::from_str(payload).map_err(|err| {
            SyncError::InvalidResponse(format!("enrichment reply was not valid JSON: {err}"))
        })?;

        Ok(EnrichedFields {
            title: reply.tiktok_title.unwrap_or_else(|| product.title.clone()),
            description: reply
                .tiktok_description
                .unwrap_or_else(|| product.description.clone()),
            category: reply.category,
            hashtags: reply.hashtags,
            keywords: reply.keywords,
        })
    }
}

/// Canned enrichment used for dry runs, so `--dry-run` exercises the
/// whole pipeline without spending tokens.
pub struct DryRunEnrichment;

#[async_trait]
impl EnrichmentClient for DryRunEnrichment {
    async fn enrich(&self, product: &Product) -> Result<EnrichedFields> {
        info!(product = %product.id, "[dry-run] skipping AI enrichment");
        Ok(EnrichedFields {
            title: product.title.clone(),
            description: product.description.clone(),
            category: None,
            hashtags: vec!["#fashion".into(), "#trending".into(), "#y2k".into()],
            keywords: vec!["trendy".into(), "stylish".into()],
        })
    }
}

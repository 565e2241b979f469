//! Deterministic fallback mapping used when enrichment is unavailable.

use shoptok_domain::{EnrichedProduct, MappingSource, Product};

/// Category assigned when the source product carries no type.
pub const DEFAULT_CATEGORY: &str = "General";

/// Hashtags substituted when a product has no tags at all.
const DEFAULT_HASHTAGS: [&str; 3] = ["#TikTokMadeMeBuyIt", "#Trending", "#ShopNow"];

/// Derive an [`EnrichedProduct`] from the raw product without any AI
/// involvement: title and description unchanged, category from the
/// product type, hashtags from the tag set (`#`-prefixed, spaces
/// removed), keywords as the lower-cased tags.
pub fn fallback_mapping(product: &Product) -> EnrichedProduct {
    let mut hashtags: Vec<String> = product
        .tags
        .iter()
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .map(|tag| {
            let compact = tag.replace(' ', "");
            if compact.starts_with('#') {
                compact
            } else {
                format!("#{compact}")
            }
        })
        .collect();
    if hashtags.is_empty() {
        hashtags = DEFAULT_HASHTAGS.iter().map(|t| (*t).to_string()).collect();
    }

    let keywords: Vec<String> = product
        .tags
        .iter()
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect();

    let category = if product.product_type.trim().is_empty() {
        DEFAULT_CATEGORY.to_string()
    } else {
        product.product_type.clone()
    };

    EnrichedProduct {
        source_id: product.id.clone(),
        title: product.title.clone(),
        description: product.description.clone(),
        category,
        hashtags,
        keywords,
        images: product.images.clone(),
        variants: product.variants.clone(),
        source: MappingSource::Fallback,
    }
}

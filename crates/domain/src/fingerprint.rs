//! Content fingerprinting for the enrichment cache.
//!
//! The fingerprint covers exactly the fields that influence enrichment
//! output (title, description, tags); products differing only in
//! inventory or price hash to the same key and share a cached mapping.

use sha2::{Digest, Sha256};

use crate::types::Product;

/// Deterministic hex fingerprint of a product's enrichment-relevant
/// fields. Tags are sorted so their order never affects the key.
pub fn product_fingerprint(product: &Product) -> String {
    let mut tags: Vec<&str> = product.tags.iter().map(String::as_str).collect();
    tags.sort_unstable();

    let mut hasher = Sha256::new();
    hasher.update(product.title.as_bytes());
    hasher.update([0u8]);
    hasher.update(product.description.as_bytes());
    for tag in tags {
        hasher.update([0u8]);
        hasher.update(tag.as_bytes());
    }
    hex::encode(hasher.finalize())
}

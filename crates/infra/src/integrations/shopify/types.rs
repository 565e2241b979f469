//! Wire types for the Shopify Admin REST API.

use serde::{Deserialize, Serialize};
use shoptok_domain::{Product, Variant};

#[derive(Debug, Deserialize)]
pub struct ProductsEnvelope {
    #[serde(default)]
    pub products: Vec<ShopifyProduct>,
}

#[derive(Debug, Deserialize)]
pub struct ShopifyProduct {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    /// Shopify transmits the description as HTML.
    #[serde(default)]
    pub body_html: Option<String>,
    #[serde(default)]
    pub handle: String,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub product_type: String,
    /// Comma-separated on the wire.
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub images: Vec<ShopifyImage>,
    #[serde(default)]
    pub variants: Vec<ShopifyVariant>,
}

#[derive(Debug, Deserialize)]
pub struct ShopifyImage {
    #[serde(default)]
    pub src: String,
}

#[derive(Debug, Deserialize)]
pub struct ShopifyVariant {
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub inventory_quantity: i64,
    #[serde(default)]
    pub inventory_item_id: Option<i64>,
    #[serde(default)]
    pub barcode: Option<String>,
}

impl From<ShopifyProduct> for Product {
    fn from(wire: ShopifyProduct) -> Self {
        let tags = wire
            .tags
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect();

        Product {
            id: wire.id.to_string(),
            title: wire.title,
            description: wire.body_html.unwrap_or_default(),
            handle: wire.handle,
            vendor: wire.vendor,
            product_type: wire.product_type,
            tags,
            images: wire.images.into_iter().map(|img| img.src).collect(),
            variants: wire.variants.into_iter().map(Variant::from).collect(),
        }
    }
}

impl From<ShopifyVariant> for Variant {
    fn from(wire: ShopifyVariant) -> Self {
        Variant {
            sku: wire.sku,
            title: wire.title,
            price: wire.price,
            inventory_quantity: wire.inventory_quantity,
            inventory_item_id: wire.inventory_item_id,
            barcode: wire.barcode.unwrap_or_default(),
        }
    }
}

/// `POST /orders/{id}/fulfillments.json` request body.
#[derive(Debug, Serialize)]
pub struct FulfillmentEnvelope {
    pub fulfillment: FulfillmentBody,
}

#[derive(Debug, Serialize)]
pub struct FulfillmentBody {
    pub notify_customer: bool,
    pub line_items: Vec<FulfillmentLineItem>,
}

#[derive(Debug, Serialize)]
pub struct FulfillmentLineItem {
    pub sku: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct FulfillmentResponse {
    pub fulfillment: Option<FulfillmentDetails>,
}

#[derive(Debug, Deserialize)]
pub struct FulfillmentDetails {
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub tracking_url: Option<String>,
    #[serde(default)]
    pub tracking_company: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_comma_split_and_trimmed() {
        let wire = ShopifyProduct {
            id: 42,
            title: "Crop Top".into(),
            body_html: Some("<p>Y2K</p>".into()),
            handle: "crop-top".into(),
            vendor: "acme".into(),
            product_type: "Apparel".into(),
            tags: "y2k, retro ,, summer".into(),
            images: vec![ShopifyImage { src: "https://cdn/x.png".into() }],
            variants: vec![],
        };

        let product = Product::from(wire);
        assert_eq!(product.id, "42");
        assert_eq!(product.tags, vec!["y2k", "retro", "summer"]);
        assert_eq!(product.description, "<p>Y2K</p>");
    }

    #[test]
    fn missing_optional_fields_default() {
        let json = r#"{"id": 7, "title": "Bare"}"#;
        let wire: ShopifyProduct = serde_json::from_str(json).unwrap();
        let product = Product::from(wire);
        assert!(product.tags.is_empty());
        assert!(product.variants.is_empty());
        assert_eq!(product.description, "");
    }
}

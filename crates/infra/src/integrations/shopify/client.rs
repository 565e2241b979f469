use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use shoptok_core::ports::SourceClient;
use shoptok_domain::{
    FulfillmentRequest, InventoryLevel, Product, Result, ShopifyConfig, SyncError, TrackingUpdate,
};
use tracing::{debug, info, warn};

use super::types::{
    FulfillmentBody, FulfillmentEnvelope, FulfillmentLineItem, FulfillmentResponse,
    ProductsEnvelope,
};
use crate::http::{error_for_status, HttpClient};

const SERVICE: &str = "shopify";
/// Admin REST page size cap.
const PAGE_SIZE: usize = 250;
const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";
/// `used/total` bucket header, e.g. `32/40`.
const CALL_LIMIT_HEADER: &str = "X-Shopify-Shop-Api-Call-Limit";

/// Source store client backed by the Shopify Admin REST API.
pub struct ShopifyClient {
    http: HttpClient,
    base_url: String,
    /// Last observed call-limit pressure, updated on every response.
    pressure: Mutex<Option<f64>>,
}

impl ShopifyClient {
    pub fn new(config: &ShopifyConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let token = HeaderValue::from_str(&config.token)
            .map_err(|_| SyncError::Config("SHOPIFY_TOKEN contains invalid characters".into()))?;
        headers.insert(ACCESS_TOKEN_HEADER, token);

        let http = HttpClient::builder()
            .user_agent("shoptok-sync")
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: format!("https://{}/admin/api/{}", config.store, config.api_version),
            pressure: Mutex::new(None),
        })
    }

    #[cfg(test)]
    pub fn with_base_url(config: &ShopifyConfig, base_url: impl Into<String>) -> Result<Self> {
        let mut client = Self::new(config)?;
        client.base_url = base_url.into();
        Ok(client)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path_and_query: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path_and_query);
        let response = self.http.send(self.http.request(Method::GET, &url)).await?;
        self.observe_call_limit(response.headers());

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| SyncError::Network(format!("failed to read response body: {err}")))?;
        if !status.is_success() {
            return Err(error_for_status(SERVICE, status, &body));
        }

        serde_json::from_str(&body).map_err(|err| {
            SyncError::InvalidResponse(format!("shopify returned malformed JSON: {err}"))
        })
    }

    fn observe_call_limit(&self, headers: &HeaderMap) {
        let Some(value) = headers.get(CALL_LIMIT_HEADER).and_then(|v| v.to_str().ok()) else {
            return;
        };
        if let Some((used, total)) = value.split_once('/') {
            if let (Ok(used), Ok(total)) = (used.trim().parse::<f64>(), total.trim().parse::<f64>())
            {
                if total > 0.0 {
                    *self.pressure.lock() = Some(used / total);
                }
            }
        }
    }
}

#[async_trait]
impl SourceClient for ShopifyClient {
    /// Fetch the whole catalog, page by page.
    async fn fetch_products(&self, limit: Option<usize>) -> Result<Vec<Product>> {
        let mut products: Vec<Product> = Vec::new();
        let mut page = 1usize;

        loop {
            let envelope: ProductsEnvelope =
                self.get_json(&format!("/products.json?limit={PAGE_SIZE}&page={page}")).await?;
            let page_len = envelope.products.len();
            products.extend(envelope.products.into_iter().map(Product::from));

            if let Some(limit) = limit {
                if products.len() >= limit {
                    products.truncate(limit);
                    break;
                }
            }
            if page_len < PAGE_SIZE {
                break;
            }
            page += 1;
            debug!(fetched = products.len(), page, "fetching next product page");
        }

        info!(count = products.len(), "fetched products from shopify");
        Ok(products)
    }

    /// Stock levels are flattened out of the catalog's variants rather
    /// than fetched per inventory item, which keeps this to one request
    /// chain per pass.
    async fn fetch_inventory(&self) -> Result<Vec<InventoryLevel>> {
        let products = self.fetch_products(None).await?;
        let mut levels = Vec::new();
        for product in products {
            for variant in product.variants {
                if variant.sku.is_empty() {
                    warn!(product = %product.id, "variant without SKU skipped");
                    continue;
                }
                levels.push(InventoryLevel {
                    sku: variant.sku,
                    available: variant.inventory_quantity,
                    inventory_item_id: variant.inventory_item_id,
                });
            }
        }
        info!(count = levels.len(), "flattened inventory levels");
        Ok(levels)
    }

    async fn create_fulfillment(
        &self,
        request: &FulfillmentRequest,
    ) -> Result<Option<TrackingUpdate>> {
        let url = format!("{}/orders/{}/fulfillments.json", self.base_url, request.order_id);
        let body = FulfillmentEnvelope {
            fulfillment: FulfillmentBody {
                notify_customer: false,
                line_items: request
                    .line_items
                    .iter()
                    .map(|item| FulfillmentLineItem {
                        sku: item.sku.clone(),
                        quantity: item.quantity,
                    })
                    .collect(),
            },
        };

        let response =
            self.http.send(self.http.request(Method::POST, &url).json(&body)).await?;
        self.observe_call_limit(response.headers());

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| SyncError::Network(format!("failed to read response body: {err}")))?;
        if !status.is_success() {
            return Err(error_for_status(SERVICE, status, &text));
        }

        let parsed: FulfillmentResponse = serde_json::from_str(&text).map_err(|err| {
            SyncError::InvalidResponse(format!("shopify returned malformed JSON: {err}"))
        })?;

        Ok(parsed.fulfillment.and_then(|details| {
            details.tracking_number.map(|tracking_number| TrackingUpdate {
                tracking_number,
                tracking_url: details.tracking_url,
                carrier: details.tracking_company,
            })
        }))
    }

    fn rate_limit_pressure(&self) -> Option<f64> {
        *self.pressure.lock()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use shoptok_domain::OrderLineItem;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn config() -> ShopifyConfig {
        ShopifyConfig {
            store: "test-store.myshopify.com".into(),
            token: "shpat_test".into(),
            api_version: "2025-10".into(),
        }
    }

    fn product_json(id: i64, sku: &str, quantity: i64) -> serde_json::Value {
        json!({
            "id": id,
            "title": format!("Product {id}"),
            "body_html": "<p>desc</p>",
            "tags": "a, b",
            "variants": [{
                "sku": sku,
                "title": "Default",
                "price": "19.99",
                "inventory_quantity": quantity,
                "inventory_item_id": id * 10
            }]
        })
    }

    #[tokio::test]
    async fn fetches_products_with_access_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products.json"))
            .and(header("X-Shopify-Access-Token", "shpat_test"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"products": [product_json(1, "SKU-1", 4)]})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = ShopifyClient::with_base_url(&config(), server.uri()).unwrap();
        let products = client.fetch_products(None).await.unwrap();

        assert_eq!(products.len(), 1);
        assert_eq!(products[0].tags, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn paginates_until_a_short_page() {
        let server = MockServer::start().await;
        let full_page: Vec<_> =
            (0..250).map(|i| product_json(i, &format!("SKU-{i}"), 1)).collect();
        Mock::given(method("GET"))
            .and(path("/products.json"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"products": full_page})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/products.json"))
            .and(query_param("page", "2"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"products": [product_json(999, "SKU-999", 1)]})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = ShopifyClient::with_base_url(&config(), server.uri()).unwrap();
        let products = client.fetch_products(None).await.unwrap();

        assert_eq!(products.len(), 251);
    }

    #[tokio::test]
    async fn inventory_is_flattened_from_variants() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({"products": [product_json(1, "SKU-1", 4), product_json(2, "SKU-2", 0)]}),
            ))
            .mount(&server)
            .await;

        let client = ShopifyClient::with_base_url(&config(), server.uri()).unwrap();
        let levels = client.fetch_inventory().await.unwrap();

        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0].sku, "SKU-1");
        assert_eq!(levels[0].available, 4);
        assert_eq!(levels[0].inventory_item_id, Some(10));
    }

    #[tokio::test]
    async fn call_limit_header_is_tracked() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"products": []}))
                    .insert_header("X-Shopify-Shop-Api-Call-Limit", "38/40"),
            )
            .mount(&server)
            .await;

        let client = ShopifyClient::with_base_url(&config(), server.uri()).unwrap();
        assert_eq!(client.rate_limit_pressure(), None);
        client.fetch_products(None).await.unwrap();
        assert_eq!(client.rate_limit_pressure(), Some(0.95));
    }

    #[tokio::test]
    async fn auth_failures_are_not_retryable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
            .mount(&server)
            .await;

        let client = ShopifyClient::with_base_url(&config(), server.uri()).unwrap();
        let err = client.fetch_products(None).await.unwrap_err();

        assert!(matches!(err, SyncError::Auth(_)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn fulfillment_returns_tracking_when_assigned() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/orders/ord-1/fulfillments.json"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "fulfillment": {
                    "tracking_number": "TRK-1",
                    "tracking_url": "https://track/TRK-1",
                    "tracking_company": "UPS"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ShopifyClient::with_base_url(&config(), server.uri()).unwrap();
        let request = FulfillmentRequest {
            order_id: "ord-1".into(),
            line_items: vec![OrderLineItem { sku: "SKU-1".into(), title: String::new(), quantity: 2 }],
        };
        let tracking = client.create_fulfillment(&request).await.unwrap().unwrap();

        assert_eq!(tracking.tracking_number, "TRK-1");
        assert_eq!(tracking.carrier.as_deref(), Some("UPS"));
    }
}

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shoptok_core::ports::{BulkPushOutcome, DestinationClient};
use shoptok_domain::{
    EnrichedProduct, InventoryUpdate, Order, Result, SyncError, TikTokConfig, TrackingUpdate,
};
use tracing::{info, warn};

use super::signing::sign_request;
use super::types::{
    BulkCreateData, BulkInventoryPayload, BulkProductPayload, CreateProductData, EmptyData,
    Envelope, InventoryItemPayload, OrdersData, ProductPayload, TrackingPayload,
};
use crate::http::{error_for_status, HttpClient};

const SERVICE: &str = "tiktok";

/// Destination store client backed by the TikTok Shop partner API.
pub struct TikTokClient {
    http: HttpClient,
    base_url: String,
    app_key: String,
    secret: String,
}

impl TikTokClient {
    pub fn new(config: &TikTokConfig) -> Result<Self> {
        Ok(Self {
            http: HttpClient::builder().user_agent("shoptok-sync").build()?,
            base_url: config.api_base.trim_end_matches('/').to_string(),
            app_key: config.app_key.clone(),
            secret: config.secret.clone(),
        })
    }

    #[cfg(test)]
    pub fn with_base_url(config: &TikTokConfig, base_url: impl Into<String>) -> Result<Self> {
        let mut client = Self::new(config)?;
        client.base_url = base_url.into();
        Ok(client)
    }

    /// Send a signed request and unwrap the `{code, message, data}`
    /// envelope. A non-zero `code` is an API failure even on HTTP 200.
    async fn call<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&B>,
    ) -> Result<T> {
        let timestamp = chrono::Utc::now().timestamp_millis();
        let mut params = vec![
            ("app_key".to_string(), self.app_key.clone()),
            ("timestamp".to_string(), timestamp.to_string()),
        ];
        params.extend_from_slice(query);

        let body_text = match body {
            Some(body) => serde_json::to_string(body).map_err(|err| {
                SyncError::Internal(format!("failed to serialize request body: {err}"))
            })?,
            None => String::new(),
        };

        let signature =
            sign_request(&self.secret, method.as_str(), path, &params, timestamp, &body_text);
        params.push(("sign".to_string(), signature));

        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method, &url).query(&params);
        if body.is_some() {
            request = request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body_text);
        }

        let response = self.http.send(request).await?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| SyncError::Network(format!("failed to read response body: {err}")))?;
        if !status.is_success() {
            return Err(error_for_status(SERVICE, status, &text));
        }

        let envelope: Envelope<T> = serde_json::from_str(&text).map_err(|err| {
            SyncError::InvalidResponse(format!("tiktok returned malformed JSON: {err}"))
        })?;
        if envelope.code != 0 {
            return Err(SyncError::Api {
                status: status.as_u16(),
                message: format!("tiktok code {}: {}", envelope.code, envelope.message),
            });
        }
        envelope.data.ok_or_else(|| {
            SyncError::InvalidResponse("tiktok response missing data field".into())
        })
    }
}

#[async_trait]
impl DestinationClient for TikTokClient {
    async fn update_inventory(&self, update: &InventoryUpdate) -> Result<()> {
        let payload = InventoryItemPayload::from(update);
        let _: EmptyData = self.call(Method::POST, "/inventory/update", &[], Some(&payload)).await?;
        info!(sku = %update.sku, quantity = update.quantity, "updated inventory");
        Ok(())
    }

    async fn bulk_update_inventory(&self, updates: &[InventoryUpdate]) -> Result<()> {
        let payload = BulkInventoryPayload {
            inventory_list: updates.iter().map(InventoryItemPayload::from).collect(),
        };
        let _: EmptyData =
            self.call(Method::POST, "/inventory/bulk_update", &[], Some(&payload)).await?;
        info!(count = updates.len(), "updated inventory batch");
        Ok(())
    }

    async fn create_product(&self, product: &EnrichedProduct) -> Result<String> {
        let payload = ProductPayload::from(product);
        let data: CreateProductData =
            self.call(Method::POST, "/products/create", &[], Some(&payload)).await?;
        info!(source_id = %product.source_id, product_id = %data.product_id, "created product");
        Ok(data.product_id)
    }

    async fn bulk_create_products(
        &self,
        products: &[EnrichedProduct],
    ) -> Result<BulkPushOutcome> {
        let payload =
            BulkProductPayload { products: products.iter().map(ProductPayload::from).collect() };
        let data: BulkCreateData =
            self.call(Method::POST, "/products/bulk_create", &[], Some(&payload)).await?;

        let mut outcome = BulkPushOutcome::default();
        for (index, result) in data.results.iter().enumerate() {
            if result.success {
                outcome.submitted += 1;
                if let Some(id) = &result.product_id {
                    outcome.created_ids.push(id.clone());
                }
            } else {
                outcome.failed += 1;
                let message =
                    result.message.clone().unwrap_or_else(|| "rejected by store".to_string());
                warn!(index, %message, "product rejected in bulk create");
                outcome.errors.push((index, message));
            }
        }
        // Stores may omit per-item results for trailing items.
        if data.results.len() < products.len() {
            for index in data.results.len()..products.len() {
                outcome.failed += 1;
                outcome.errors.push((index, "no result returned for item".to_string()));
            }
        }
        Ok(outcome)
    }

    async fn update_product(&self, product_id: &str, product: &EnrichedProduct) -> Result<()> {
        #[derive(Serialize)]
        struct UpdatePayload<'a> {
            product_id: &'a str,
            #[serde(flatten)]
            product: ProductPayload,
        }
        let payload = UpdatePayload { product_id, product: ProductPayload::from(product) };
        let _: EmptyData = self.call(Method::PUT, "/products/update", &[], Some(&payload)).await?;
        info!(%product_id, "updated product");
        Ok(())
    }

    async fn list_orders(&self, limit: usize) -> Result<Vec<Order>> {
        let query = [("limit".to_string(), limit.to_string())];
        let data: OrdersData = self.call::<(), _>(Method::GET, "/orders/list", &query, None).await?;
        info!(count = data.orders.len(), "fetched orders");
        Ok(data.orders.into_iter().map(Order::from).collect())
    }

    async fn update_tracking(&self, order_id: &str, tracking: &TrackingUpdate) -> Result<()> {
        let payload = TrackingPayload::new(order_id, tracking);
        let _: EmptyData =
            self.call(Method::POST, "/orders/update_tracking", &[], Some(&payload)).await?;
        info!(%order_id, tracking = %tracking.tracking_number, "updated order tracking");
        Ok(())
    }
}

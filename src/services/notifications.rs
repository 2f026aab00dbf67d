//! Outbound low-stock notification boundary.
//!
//! Delivery is best-effort: the alert workflow commits first and notifies
//! after, and a failed delivery is logged and swallowed. The concrete
//! transport behind the endpoint (mail relay, chat bridge, pager) is a
//! collaborator concern; this service only speaks the wire contract.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

use crate::errors::ServiceError;

/// Contract consumed by the alert deduplicator when a part crosses into
/// low-stock state. Returns whether the notification was delivered.
#[async_trait]
pub trait LowStockNotifier: Send + Sync {
    async fn notify_low_stock(
        &self,
        part_name: &str,
        quantity: i32,
        min_quantity: i32,
        part_id: i32,
    ) -> Result<bool, ServiceError>;
}

/// JSON payload posted to the configured endpoint
#[derive(Debug, Serialize)]
struct LowStockPayload<'a> {
    event: &'static str,
    part_id: i32,
    part_name: &'a str,
    quantity: i32,
    min_quantity: i32,
}

/// Posts low-stock events to a configured webhook endpoint.
pub struct WebhookNotifier {
    endpoint: String,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(endpoint: String, timeout: Duration) -> Self {
        Self {
            endpoint,
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }
}

#[async_trait]
impl LowStockNotifier for WebhookNotifier {
    async fn notify_low_stock(
        &self,
        part_name: &str,
        quantity: i32,
        min_quantity: i32,
        part_id: i32,
    ) -> Result<bool, ServiceError> {
        let payload = LowStockPayload {
            event: "low_stock",
            part_id,
            part_name,
            quantity,
            min_quantity,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ServiceError::ExternalServiceError(e.to_string()))?;

        if response.status().is_success() {
            info!(part_id, part_name, "low-stock notification delivered");
            Ok(true)
        } else {
            warn!(
                part_id,
                status = %response.status(),
                "low-stock notification rejected by endpoint"
            );
            Ok(false)
        }
    }
}

/// No-op notifier used when notifications are disabled or unconfigured.
pub struct NoopNotifier;

#[async_trait]
impl LowStockNotifier for NoopNotifier {
    async fn notify_low_stock(
        &self,
        _part_name: &str,
        _quantity: i32,
        _min_quantity: i32,
        _part_id: i32,
    ) -> Result<bool, ServiceError> {
        Ok(false)
    }
}

//! Shop backend client: order creation and payment callbacks.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use ethpay_core::{OrderId, PaymentId, TransactionId};
use ethpay_gateway::{ApiClient, ApiError};

use crate::cart::CartLine;
use crate::checkout::ShippingDetails;

/// An order accepted by the shop.
///
/// Older shop deployments omit the payment id; the checkout flow generates a
/// client-side fallback in that case.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedOrder {
    #[serde(alias = "id")]
    pub order_id: OrderId,
    #[serde(default)]
    pub payment_id: Option<PaymentId>,
    #[serde(default)]
    pub amount: Option<Decimal>,
}

/// Order status as reported by `shop/payment/status/`.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderPaymentStatus {
    pub order_id: OrderId,
    pub payment_id: PaymentId,
    pub status: String,
    #[serde(default)]
    pub total_amount: Option<Decimal>,
}

#[derive(Debug, Serialize)]
struct CreateOrderRequest<'a> {
    items: &'a [CartLine],
    total: Decimal,
    email: &'a str,
    name: &'a str,
    address: &'a str,
    phone: &'a str,
    payment_method: &'static str,
    status: &'static str,
}

/// Client for the shop's order and payment-callback endpoints.
#[derive(Debug, Clone)]
pub struct ShopClient {
    client: ApiClient,
}

impl ShopClient {
    /// Create the client; `client` must point at the shop API.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Create a pending order from a cart snapshot and contact details.
    ///
    /// Not idempotent; the checkout flow never retries it automatically.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the shop rejects the order or the request
    /// fails.
    #[instrument(skip(self, lines, shipping), fields(total = %total))]
    pub async fn create_order(
        &self,
        lines: &[CartLine],
        total: Decimal,
        shipping: &ShippingDetails,
    ) -> Result<CreatedOrder, ApiError> {
        self.client
            .post(
                "shop/orders/create/",
                &CreateOrderRequest {
                    items: lines,
                    total,
                    email: &shipping.email,
                    name: &shipping.name,
                    address: &shipping.address,
                    phone: &shipping.phone,
                    payment_method: "bank_transfer",
                    status: "pending",
                },
            )
            .await
    }

    /// Report the payment outcome back to the shop so it can mark the order.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the callback fails; callers treat this as
    /// best-effort once payment has already settled.
    #[instrument(skip(self))]
    pub async fn payment_callback(
        &self,
        payment_id: &PaymentId,
        status: &str,
        transaction_id: &TransactionId,
    ) -> Result<(), ApiError> {
        let _: serde_json::Value = self
            .client
            .post(
                "shop/payment/callback/",
                &serde_json::json!({
                    "payment_id": payment_id,
                    "status": status,
                    "transaction_id": transaction_id,
                }),
            )
            .await?;
        Ok(())
    }

    /// Check the payment status of an order.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Api`] with status 404 for an unknown payment id.
    #[instrument(skip(self))]
    pub async fn payment_status(
        &self,
        payment_id: &PaymentId,
    ) -> Result<OrderPaymentStatus, ApiError> {
        self.client
            .get(&format!("shop/payment/status/{payment_id}/"))
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use ethpay_core::ProductId;
    use ethpay_gateway::{GatewayConfig, MemoryStore, SessionStore};
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn shop_for(uri: &str) -> ShopClient {
        let config =
            GatewayConfig::with_urls("http://localhost:8001/api", &format!("{uri}/api")).unwrap();
        let session = SessionStore::new(Arc::new(MemoryStore::new()));
        ShopClient::new(ApiClient::for_shop(&config, session).unwrap())
    }

    fn shipping() -> ShippingDetails {
        ShippingDetails {
            name: "Demo Customer".into(),
            email: "customer@demo.com".into(),
            address: "Bole Road, Addis Ababa".into(),
            phone: String::new(),
        }
    }

    #[tokio::test]
    async fn test_create_order_sends_cart_snapshot() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/shop/orders/create/"))
            .and(body_partial_json(serde_json::json!({
                "payment_method": "bank_transfer",
                "status": "pending",
                "email": "customer@demo.com",
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "success": true,
                "order_id": "ORD-77",
                "payment_id": "PAY-77",
                "amount": "200.00",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let shop = shop_for(&server.uri());
        let lines = vec![CartLine {
            product_id: ProductId::new(1),
            name: "Habesha Shirt".into(),
            unit_price: dec!(100.00),
            quantity: 2,
            category: "clothing".into(),
        }];

        let order = shop
            .create_order(&lines, dec!(200.00), &shipping())
            .await
            .unwrap();
        assert_eq!(order.order_id.as_str(), "ORD-77");
        assert_eq!(order.payment_id.as_ref().map(PaymentId::as_str), Some("PAY-77"));
    }

    #[tokio::test]
    async fn test_created_order_tolerates_missing_payment_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/shop/orders/create/"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "success": true,
                "id": "ORD-legacy",
            })))
            .mount(&server)
            .await;

        let shop = shop_for(&server.uri());
        let order = shop
            .create_order(&[], dec!(10.00), &shipping())
            .await
            .unwrap();
        assert_eq!(order.order_id.as_str(), "ORD-legacy");
        assert!(order.payment_id.is_none());
    }
}

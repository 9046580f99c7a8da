//! Product catalog access.
//!
//! The shop exposes a flat product list; filtering and lookup happen
//! client-side, the same way the storefront UI does it.

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use ethpay_core::ProductId;
use ethpay_gateway::{ApiClient, ApiError};

/// A catalog product.
#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Client for the shop's catalog endpoints.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: ApiClient,
}

impl CatalogClient {
    /// Create the client; `client` must point at the shop API.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Fetch the full product list.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        self.client.get("shop/products/").await
    }

    /// Fetch one product by id.
    ///
    /// The shop has no detail endpoint, so this filters the list.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Api`] with status 404 when the id is unknown.
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        self.list_products()
            .await?
            .into_iter()
            .find(|product| product.id == id)
            .ok_or(ApiError::Api {
                status: 404,
                message: format!("Product not found: {id}"),
            })
    }

    /// Products in one category.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    #[instrument(skip(self))]
    pub async fn products_in_category(&self, category: &str) -> Result<Vec<Product>, ApiError> {
        let mut products = self.list_products().await?;
        products.retain(|product| product.category.eq_ignore_ascii_case(category));
        Ok(products)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use ethpay_gateway::{GatewayConfig, MemoryStore, SessionStore};
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn catalog_for(server: &MockServer) -> CatalogClient {
        let config = GatewayConfig::with_urls(
            "http://localhost:8001/api",
            &format!("{}/api", server.uri()),
        )
        .unwrap();
        let session = SessionStore::new(Arc::new(MemoryStore::new()));
        CatalogClient::new(ApiClient::for_shop(&config, session).unwrap())
    }

    fn products_body() -> serde_json::Value {
        serde_json::json!([
            {"id": 1, "name": "Habesha Shirt", "price": "100.00", "category": "clothing"},
            {"id": 2, "name": "Yirgacheffe Beans", "price": "35.50", "category": "coffee"},
        ])
    }

    #[tokio::test]
    async fn test_list_and_lookup() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/shop/products/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(products_body()))
            .mount(&server)
            .await;

        let catalog = catalog_for(&server).await;
        let products = catalog.list_products().await.unwrap();
        assert_eq!(products.len(), 2);

        let product = catalog.get_product(ProductId::new(2)).await.unwrap();
        assert_eq!(product.price, dec!(35.50));

        let missing = catalog.get_product(ProductId::new(99)).await.unwrap_err();
        assert!(matches!(missing, ApiError::Api { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_category_filter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/shop/products/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(products_body()))
            .mount(&server)
            .await;

        let catalog = catalog_for(&server).await;
        let coffee = catalog.products_in_category("Coffee").await.unwrap();
        assert_eq!(coffee.len(), 1);
        assert_eq!(coffee[0].name, "Yirgacheffe Beans");
    }
}

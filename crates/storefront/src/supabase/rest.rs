//! PostgREST client for the `products`, `orders` and `order_items` tables.

use tracing::instrument;
use url::Url;
use warung_core::{NewProduct, OrderStatus, Product};

use super::{SupabaseError, api_error, build_http_client, service_url};
use crate::config::SupabaseConfig;
use crate::models::{NewOrder, NewOrderItem, OrderRow, OrderStatusUpdate};

/// Columns returned for products.
const PRODUCT_COLUMNS: &str = "id,name,description,price,image_url";

/// Columns returned for orders.
const ORDER_COLUMNS: &str = "id,external_id,status,total";

/// `Prefer` header asking PostgREST to echo inserted rows.
const RETURN_REPRESENTATION: &str = "return=representation";

/// `Prefer` header asking PostgREST for an empty response.
const RETURN_MINIMAL: &str = "return=minimal";

/// Database client over the Supabase REST API.
#[derive(Clone)]
pub struct SupabaseClient {
    client: reqwest::Client,
    rest_url: Url,
}

impl SupabaseClient {
    /// Create a new REST client.
    ///
    /// # Errors
    ///
    /// Returns error if the key is not a valid header value, the project URL
    /// cannot be extended, or the HTTP client fails to build.
    pub fn new(config: &SupabaseConfig) -> Result<Self, SupabaseError> {
        Ok(Self {
            client: build_http_client(config)?,
            rest_url: service_url(&config.url, "rest/v1/")?,
        })
    }

    fn table_url(&self, table: &str) -> Result<Url, SupabaseError> {
        self.rest_url
            .join(table)
            .map_err(|e| SupabaseError::Config(format!("Invalid table URL: {e}")))
    }

    /// List products, newest first.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the rows cannot be decoded.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, SupabaseError> {
        let mut url = self.table_url("products")?;
        url.query_pairs_mut()
            .append_pair("select", PRODUCT_COLUMNS)
            .append_pair("order", "created_at.desc");

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| SupabaseError::Parse(e.to_string()))
    }

    /// Insert a product and return the stored row.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or no row comes back.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn insert_product(&self, product: &NewProduct) -> Result<Product, SupabaseError> {
        self.insert_returning("products", PRODUCT_COLUMNS, product)
            .await
    }

    /// Insert an order and return the stored row.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or no row comes back.
    #[instrument(skip(self, order), fields(external_id = %order.external_id))]
    pub async fn insert_order(&self, order: &NewOrder) -> Result<OrderRow, SupabaseError> {
        self.insert_returning("orders", ORDER_COLUMNS, order).await
    }

    /// Insert the items of an order.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self, items), fields(count = items.len()))]
    pub async fn insert_order_items(&self, items: &[NewOrderItem]) -> Result<(), SupabaseError> {
        let url = self.table_url("order_items")?;
        let response = self
            .client
            .post(url)
            .header("Prefer", RETURN_MINIMAL)
            .json(items)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        Ok(())
    }

    /// Set the status of the order with the given provider reference.
    ///
    /// Matching no row is not an error.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn update_order_status(
        &self,
        external_id: &str,
        status: OrderStatus,
    ) -> Result<(), SupabaseError> {
        let mut url = self.table_url("orders")?;
        url.query_pairs_mut()
            .append_pair("external_id", &format!("eq.{external_id}"));

        let response = self
            .client
            .patch(url)
            .header("Prefer", RETURN_MINIMAL)
            .json(&OrderStatusUpdate { status })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        Ok(())
    }

    /// Check that the REST API answers.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the API reports an error.
    pub async fn ping(&self) -> Result<(), SupabaseError> {
        let mut url = self.table_url("products")?;
        url.query_pairs_mut()
            .append_pair("select", "id")
            .append_pair("limit", "1");

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        Ok(())
    }

    /// Insert one row and decode the single row PostgREST echoes back.
    async fn insert_returning<B, T>(
        &self,
        table: &str,
        columns: &str,
        row: &B,
    ) -> Result<T, SupabaseError>
    where
        B: serde::Serialize + Sync,
        T: serde::de::DeserializeOwned + Send,
    {
        let mut url = self.table_url(table)?;
        url.query_pairs_mut().append_pair("select", columns);

        let response = self
            .client
            .post(url)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(row)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let rows: Vec<T> = response
            .json()
            .await
            .map_err(|e| SupabaseError::Parse(e.to_string()))?;
        rows.into_iter()
            .next()
            .ok_or_else(|| SupabaseError::Parse(format!("insert into {table} returned no rows")))
    }
}

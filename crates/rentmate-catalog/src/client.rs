//! Typed client for the remote rental store (Supabase/PostgREST).
//!
//! All availability and booking logic lives in stored procedures on the
//! database side; this client only shapes requests and decodes rows.

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::CatalogError;
use crate::types::{Booking, Item, ItemSummary};
use crate::window::RentalWindow;

#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl CatalogClient {
    pub fn new(base_url: impl Into<String>, service_key: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
            service_key: service_key.into(),
        }
    }

    /// Items free for the whole window, matched against the catalog's
    /// full-text index. `query` is a search phrase; `None` skips the text
    /// filter and returns everything available in the window.
    ///
    /// Zero matches is `Ok(vec![])`, never an error.
    pub async fn available_items(
        &self,
        window: &RentalWindow,
        query: Option<&str>,
    ) -> Result<Vec<ItemSummary>, CatalogError> {
        let mut body = serde_json::json!({
            "start_date": window.start_iso(),
            "end_date": window.end_iso(),
        });
        if let Some(q) = query {
            body["search_query"] = Value::String(q.to_string());
        }

        debug!(start = %window.start_iso(), end = %window.end_iso(), query = ?query, "calling available_items");

        let resp = self.rpc("available_items", &body).send().await?;
        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status, body = %body, "available_items RPC error");
            return Err(CatalogError::Api { status, body });
        }

        resp.json::<Vec<ItemSummary>>()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))
    }

    /// Fetch a single catalog row by id. A missing row is a distinct
    /// `NotFound`, not a generic API error.
    pub async fn fetch_item(&self, id: &str) -> Result<Item, CatalogError> {
        let url = format!(
            "{}/rest/v1/items?id=eq.{}&select=*",
            self.base_url,
            urlencoding::encode(id)
        );

        debug!(item_id = %id, "fetching item row");

        let resp = self
            .client
            .get(&url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            // single-object mode: PostgREST answers 406 when rows != 1
            .header("accept", "application/vnd.pgrst.object+json")
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status == 404 || status == 406 {
            return Err(CatalogError::NotFound(id.to_string()));
        }
        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status, body = %body, "item fetch error");
            return Err(CatalogError::Api { status, body });
        }

        resp.json::<Item>()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))
    }

    /// Create a booking through the store's atomic procedure. Overlap with
    /// existing bookings or blocked dates makes the procedure itself fail,
    /// which surfaces here as an `Api` error.
    pub async fn create_booking_if_available(
        &self,
        user_id: &str,
        item_id: &str,
        window: &RentalWindow,
    ) -> Result<Booking, CatalogError> {
        let body = serde_json::json!({
            "p_user_id": user_id,
            "p_item_id": item_id,
            "p_start_date": window.start_iso(),
            "p_end_date": window.end_iso(),
        });

        debug!(item_id, start = %window.start_iso(), end = %window.end_iso(), "calling create_booking_if_available");

        let resp = self
            .rpc("create_booking_if_available", &body)
            .send()
            .await?;
        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status, body = %body, "create_booking_if_available RPC error");
            return Err(CatalogError::Api { status, body });
        }

        resp.json::<Booking>()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))
    }

    fn rpc(&self, function: &str, body: &Value) -> reqwest::RequestBuilder {
        self.client
            .post(format!("{}/rest/v1/rpc/{}", self.base_url, function))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .header("content-type", "application/json")
            .json(body)
    }
}

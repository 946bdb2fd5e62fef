use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Full catalog row, fetched by id. Row ids are uuid strings. The table
/// also carries a full-text index column (`fts`) that only the stored
/// procedures read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub price_per_day: f64,
    #[serde(default)]
    pub deposit: Option<f64>,
    #[serde(default)]
    pub is_available: Option<bool>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Row shape returned by the `available_items` procedure — the subset of
/// the item row the chat UI renders as a result card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub price_per_day: f64,
    #[serde(default)]
    pub deposit: Option<f64>,
}

/// Booking row returned by `create_booking_if_available`. The procedure is
/// the only writer; overlap checks against existing bookings and blocked
/// dates happen inside it, atomically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub item_id: String,
    pub user_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

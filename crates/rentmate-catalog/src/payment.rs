use serde::{Deserialize, Serialize};

use crate::types::Item;
use crate::window::RentalWindow;

/// Quote produced for a checkout link, rendered by the UI's payment card.
/// Field names are the wire contract with the UI, hence the camelCase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentQuote {
    pub link: String,
    #[serde(rename = "startDate")]
    pub start_date: String,
    #[serde(rename = "endDate")]
    pub end_date: String,
    #[serde(rename = "durationDays")]
    pub duration_days: i64,
    pub amount: f64,
    pub item: Item,
}

impl PaymentQuote {
    /// Build a quote for `item` over `window`.
    ///
    /// Duration and amount are always recomputed here from the window and
    /// the stored per-day price; callers never supply either.
    pub fn build(checkout_base_url: &str, item: Item, window: &RentalWindow) -> Self {
        let duration_days = window.duration_days();
        let amount = item.price_per_day * duration_days as f64;
        let link = format!(
            "{}/checkout?item={}&amount={}&start={}&end={}",
            checkout_base_url.trim_end_matches('/'),
            item.id,
            amount,
            window.start_iso(),
            window.end_iso(),
        );
        Self {
            link,
            start_date: window.start_iso(),
            end_date: window.end_iso(),
            duration_days,
            amount,
            item,
        }
    }
}

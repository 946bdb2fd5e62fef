use std::sync::Arc;

use async_trait::async_trait;
use rentmate_catalog::{CatalogClient, PaymentQuote, RentalWindow};
use rentmate_protocol::{names, IntentData};
use serde_json::Value;
use tracing::warn;

use super::{Tool, ToolOutcome};

/// Generate a checkout link for the item the user picked.
///
/// Model-supplied arithmetic is not trusted: the rental duration and the
/// amount are recomputed from the date range, availability is re-checked for
/// the window, and when the request carried Reserve intent metadata the item
/// id must match the user's actual selection.
pub struct PaymentLinkTool {
    catalog: Arc<CatalogClient>,
    checkout_base_url: String,
    intent: Option<IntentData>,
}

impl PaymentLinkTool {
    pub fn new(
        catalog: Arc<CatalogClient>,
        checkout_base_url: impl Into<String>,
        intent: Option<IntentData>,
    ) -> Self {
        Self {
            catalog,
            checkout_base_url: checkout_base_url.into(),
            intent,
        }
    }
}

#[async_trait]
impl Tool for PaymentLinkTool {
    fn name(&self) -> &str {
        names::TOOL_GENERATE_PAYMENT_LINK
    }

    fn description(&self) -> &str {
        "Generates a payment link for the item the user has chosen, over the agreed rental period."
    }

    fn input_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "id": {
                    "type": "string",
                    "description": "Id of the item the user picked."
                },
                "startDate": {
                    "type": "string",
                    "description": "Start date for the rental period, YYYY-MM-DD."
                },
                "endDate": {
                    "type": "string",
                    "description": "End date for the rental period, YYYY-MM-DD."
                },
                "duration": {
                    "type": "number",
                    "description": "Rental duration in days."
                }
            },
            "required": ["id", "startDate", "endDate", "duration"]
        })
    }

    async fn execute(&self, args: Value) -> ToolOutcome {
        let id = match args.get("id") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            _ => return ToolOutcome::error("missing required parameter: id"),
        };

        // guard against the model quoting a different item than the user picked
        if let Some(selected) = self.intent.as_ref().and_then(|i| i.id_as_string()) {
            if selected != id {
                warn!(requested = %id, selected = %selected, "payment link rejected: item id mismatch");
                return ToolOutcome::error(format!(
                    "item {id} is not the item the user selected ({selected})"
                ));
            }
        }

        let start = args.get("startDate").and_then(|v| v.as_str()).unwrap_or("");
        let end = args.get("endDate").and_then(|v| v.as_str()).unwrap_or("");
        let window = match RentalWindow::parse(start, end) {
            Ok(w) => w,
            Err(e) => return ToolOutcome::error(format!("invalid rental period: {e}")),
        };

        // the model's duration argument is advisory only
        if let Some(supplied) = args.get("duration").and_then(|v| v.as_f64()) {
            if supplied != window.duration_days() as f64 {
                warn!(
                    supplied,
                    computed = window.duration_days(),
                    "ignoring model-supplied duration"
                );
            }
        }

        let item = match self.catalog.fetch_item(&id).await {
            Ok(item) => item,
            Err(e) if e.is_not_found() => {
                return ToolOutcome::error(format!("item {id} not found"));
            }
            Err(e) => {
                warn!(error = %e, item_id = %id, "item lookup failed");
                return ToolOutcome::error(format!("item lookup failed: {e}"));
            }
        };

        // never quote an item the window can't actually book
        match self.catalog.available_items(&window, None).await {
            Ok(rows) if rows.iter().any(|r| r.id == item.id) => {}
            Ok(_) => {
                return ToolOutcome::error(format!(
                    "{} is not available from {} to {}",
                    item.name,
                    window.start_iso(),
                    window.end_iso()
                ));
            }
            Err(e) => {
                warn!(error = %e, item_id = %id, "availability check failed");
                return ToolOutcome::error(format!("availability check failed: {e}"));
            }
        }

        ToolOutcome::success(PaymentQuote::build(&self.checkout_base_url, item, &window))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CHECKOUT: &str = "https://pay.rentmate.app";
    const ITEM_ID: &str = "a0eebc99-9c0b-4ef8-bb6d-6bb9bd380a11";

    fn tool(server: &MockServer, intent: Option<IntentData>) -> PaymentLinkTool {
        PaymentLinkTool::new(
            Arc::new(CatalogClient::new(server.uri(), "service-key")),
            CHECKOUT,
            intent,
        )
    }

    fn args() -> Value {
        serde_json::json!({
            "id": ITEM_ID,
            "startDate": "2026-01-10",
            "endDate": "2026-01-13",
            "duration": 99
        })
    }

    async fn mount_item(server: &MockServer) {
        let row = serde_json::json!({
            "id": ITEM_ID, "name": "PS5", "description": "Console", "image_url": null,
            "price_per_day": 500, "deposit": 2000, "is_available": true,
            "category_id": "6c2a7f64-31fd-4f72-9a86-2f5d7e1b8c03",
            "created_at": "2025-11-02T09:30:00+00:00"
        });
        Mock::given(method("GET"))
            .and(path("/rest/v1/items"))
            .and(query_param("id", format!("eq.{ITEM_ID}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(&row))
            .mount(server)
            .await;
    }

    async fn mount_availability(server: &MockServer, rows: Value) {
        Mock::given(method("POST"))
            .and(path("/rest/v1/rpc/available_items"))
            .and(body_json(serde_json::json!({
                "start_date": "2026-01-10",
                "end_date": "2026-01-13"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(&rows))
            .mount(server)
            .await;
    }

    fn available_row() -> Value {
        serde_json::json!([
            {"id": ITEM_ID, "name": "PS5", "description": "Console", "image_url": null,
             "price_per_day": 500, "deposit": 2000}
        ])
    }

    #[tokio::test]
    async fn quote_recomputes_duration_and_amount() {
        let server = MockServer::start().await;
        mount_item(&server).await;
        mount_availability(&server, available_row()).await;

        let outcome = tool(&server, None).execute(args()).await;

        assert!(!outcome.is_error, "got {:?}", outcome.payload);
        // duration 99 from the model is ignored; 3 days x 500 = 1500
        assert_eq!(outcome.payload["durationDays"], 3);
        assert_eq!(outcome.payload["amount"], 1500.0);
        assert_eq!(outcome.payload["item"]["name"], "PS5");
        let link = outcome.payload["link"].as_str().unwrap();
        assert!(link.starts_with(&format!("{CHECKOUT}/checkout?item={ITEM_ID}")));
    }

    #[tokio::test]
    async fn unavailable_item_is_not_quoted() {
        let server = MockServer::start().await;
        mount_item(&server).await;
        // the window's availability list contains a different item
        mount_availability(
            &server,
            serde_json::json!([
                {"id": "5a8f0e3b-2c41-4d86-9b7a-1e6c4d2f8a09", "name": "Xbox",
                 "description": null, "image_url": null,
                 "price_per_day": 400, "deposit": 1500}
            ]),
        )
        .await;

        let outcome = tool(&server, None).execute(args()).await;

        assert!(outcome.is_error);
        assert!(outcome.payload["error"]
            .as_str()
            .unwrap()
            .contains("not available from 2026-01-10 to 2026-01-13"));
    }

    #[tokio::test]
    async fn missing_item_is_reported_as_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/items"))
            .respond_with(ResponseTemplate::new(406).set_body_string("JSON object requested"))
            .mount(&server)
            .await;

        let outcome = tool(&server, None).execute(args()).await;

        assert!(outcome.is_error);
        assert_eq!(
            outcome.payload["error"].as_str().unwrap(),
            format!("item {ITEM_ID} not found")
        );
    }

    #[tokio::test]
    async fn intent_mismatch_is_rejected_before_any_lookup() {
        let server = MockServer::start().await;

        let intent: IntentData = serde_json::from_str(
            r#"{"intent":"RESERVE","id":"9e107d9d-3721-4b12-8f0a-54d1b2c3d4e5"}"#,
        )
        .unwrap();
        let outcome = tool(&server, Some(intent)).execute(args()).await;

        assert!(outcome.is_error);
        assert!(outcome.payload["error"]
            .as_str()
            .unwrap()
            .contains("not the item the user selected"));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn intent_match_allows_the_quote() {
        let server = MockServer::start().await;
        mount_item(&server).await;
        mount_availability(&server, available_row()).await;

        let intent: IntentData = serde_json::from_str(&format!(
            r#"{{"intent":"RESERVE","id":"{ITEM_ID}"}}"#
        ))
        .unwrap();
        let outcome = tool(&server, Some(intent)).execute(args()).await;

        assert!(!outcome.is_error, "got {:?}", outcome.payload);
        assert_eq!(outcome.payload["amount"], 1500.0);
    }

    #[tokio::test]
    async fn availability_check_failure_is_distinct_from_unavailable() {
        let server = MockServer::start().await;
        mount_item(&server).await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/rpc/available_items"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let outcome = tool(&server, None).execute(args()).await;

        assert!(outcome.is_error);
        assert!(outcome.payload["error"]
            .as_str()
            .unwrap()
            .contains("availability check failed"));
    }

    #[tokio::test]
    async fn inverted_window_is_rejected() {
        let server = MockServer::start().await;

        let outcome = tool(&server, None)
            .execute(serde_json::json!({
                "id": ITEM_ID,
                "startDate": "2026-01-13",
                "endDate": "2026-01-10",
                "duration": 3
            }))
            .await;

        assert!(outcome.is_error);
        assert!(outcome.payload["error"]
            .as_str()
            .unwrap()
            .contains("invalid rental period"));
    }
}

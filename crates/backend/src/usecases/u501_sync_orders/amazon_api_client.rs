use super::adapter::{http_client, null_as_default, MarketplaceAdapter, RawOrder};
use super::error::SyncError;
use super::fixtures;
use crate::shared::config::{AmazonConfig, DataSource};
use crate::shared::dates::DayWindow;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use contracts::enums::marketplace_type::MarketplaceType;
use contracts::usecases::u501_sync_orders::{AmazonCredentials, MarketplaceCredentials};
use serde::{Deserialize, Serialize};

/// Order states requested from the Orders API
pub const ACTIVE_ORDER_STATUSES: &[&str] = &[
    "Pending",
    "Unshipped",
    "PartiallyShipped",
    "Shipped",
    "InvoiceUnconfirmed",
];

const MAX_PAGES: usize = 100;

/// HTTP client for Amazon Selling Partner API (Orders v0)
pub struct AmazonApiClient {
    client: reqwest::Client,
    config: AmazonConfig,
    data_source: DataSource,
}

impl AmazonApiClient {
    pub fn new(
        config: AmazonConfig,
        data_source: DataSource,
        timeout: std::time::Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            config,
            data_source,
        })
    }

    /// SP-API host for a seller region; empty region means "eu" (serves India)
    pub fn endpoint_for_region(&self, region: &str) -> Result<String, SyncError> {
        if let Some(base) = &self.config.api_base {
            return Ok(base.trim_end_matches('/').to_string());
        }
        let region = match region.trim().to_lowercase().as_str() {
            "" => "eu".to_string(),
            r @ ("na" | "eu" | "fe") => r.to_string(),
            other => {
                return Err(SyncError::Validation(format!(
                    "Unknown Amazon region '{}', expected na, eu or fe",
                    other
                )))
            }
        };
        Ok(format!("https://sellingpartnerapi-{}.amazon.com", region))
    }

    /// Exchange the refresh token for an LWA access token
    pub async fn fetch_access_token(
        &self,
        credentials: &AmazonCredentials,
    ) -> Result<String, SyncError> {
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", credentials.refresh_token.as_str()),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
        ];

        tracing::debug!(
            "POST {} (grant_type=refresh_token, client_id={})",
            self.config.token_url,
            credentials.client_id
        );

        let response = self
            .client
            .post(&self.config.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| SyncError::from_transport("Amazon token request", &e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Amazon token request failed with status {}: {}", status, body);
            return Err(SyncError::Auth(format!(
                "Amazon rejected the credentials (HTTP {})",
                status.as_u16()
            )));
        }

        let token: AccessTokenResponse = response
            .json()
            .await
            .map_err(|e| SyncError::Auth(format!("Invalid Amazon token response: {}", e)))?;

        if token.access_token.trim().is_empty() {
            return Err(SyncError::Auth("Amazon returned an empty access token".into()));
        }
        Ok(token.access_token)
    }

    /// Fetch one page of orders
    pub async fn fetch_orders_page(
        &self,
        endpoint: &str,
        access_token: &str,
        query: &[(&str, String)],
    ) -> Result<AmazonOrdersPayload, SyncError> {
        let url = format!("{}/orders/v0/orders", endpoint);
        tracing::debug!("GET {} x-amz-access-token: **** query: {:?}", url, query);

        let response = self
            .client
            .get(&url)
            .header("x-amz-access-token", access_token)
            .header("Accept", "application/json")
            .query(query)
            .send()
            .await
            .map_err(|e| SyncError::from_transport("Amazon orders request", &e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Amazon orders request failed with status {}: {}", status, body);
            return Err(match status.as_u16() {
                400 => SyncError::Validation(format!("Amazon rejected the order query: {}", body)),
                401 | 403 => SyncError::Auth(format!(
                    "Amazon rejected the access token (HTTP {})",
                    status.as_u16()
                )),
                code => SyncError::Fetch(format!("Amazon orders request failed (HTTP {})", code)),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| SyncError::from_transport("Amazon orders response", &e))?;

        serde_json::from_str::<AmazonOrdersResponse>(&body)
            .map(|r| r.payload)
            .map_err(|e| {
                let preview: String = body.chars().take(500).collect();
                tracing::error!("Failed to parse Amazon orders response: {}. Body: {}", e, preview);
                SyncError::Fetch(format!("Failed to parse Amazon orders response: {}", e))
            })
    }

    async fn fetch_live(
        &self,
        credentials: &AmazonCredentials,
        window: &DayWindow,
    ) -> Result<Vec<RawOrder>, SyncError> {
        let endpoint = self.endpoint_for_region(&credentials.region)?;
        let Some((created_after, created_before)) = created_bounds(window, Utc::now()) else {
            tracing::info!("Amazon window starts in the future, nothing to fetch");
            return Ok(Vec::new());
        };

        let access_token = self.fetch_access_token(credentials).await?;

        let mut orders = Vec::new();
        let mut next_token: Option<String> = None;
        for page in 0..MAX_PAGES {
            let query = match &next_token {
                None => vec![
                    ("MarketplaceIds", self.config.marketplace_id.clone()),
                    ("CreatedAfter", format_amz(created_after)),
                    ("CreatedBefore", format_amz(created_before)),
                    ("OrderStatuses", ACTIVE_ORDER_STATUSES.join(",")),
                    ("MaxResultsPerPage", "100".to_string()),
                ],
                Some(token) => vec![
                    ("MarketplaceIds", self.config.marketplace_id.clone()),
                    ("NextToken", token.clone()),
                ],
            };

            let payload = self.fetch_orders_page(&endpoint, &access_token, &query).await?;
            tracing::info!(
                "Amazon orders page {}: {} orders, more: {}",
                page + 1,
                payload.orders.len(),
                payload.next_token.is_some()
            );
            orders.extend(payload.orders.into_iter().map(RawOrder::Amazon));

            match payload.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => return Ok(orders),
            }
        }

        tracing::warn!("Amazon pagination stopped after {} pages", MAX_PAGES);
        Ok(orders)
    }
}

/// `CreatedAfter`/`CreatedBefore` for a window. The API rejects bounds
/// later than two minutes before now; `None` when nothing is left.
pub fn created_bounds(
    window: &DayWindow,
    now: DateTime<Utc>,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let after = window.start_utc();
    let before = window.end_utc_inclusive().min(now - Duration::minutes(2));
    (after < before).then_some((after, before))
}

fn format_amz(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[async_trait]
impl MarketplaceAdapter for AmazonApiClient {
    fn marketplace(&self) -> MarketplaceType {
        MarketplaceType::Amazon
    }

    async fn fetch_orders(
        &self,
        credentials: &MarketplaceCredentials,
        window: &DayWindow,
    ) -> Result<Vec<RawOrder>, SyncError> {
        let MarketplaceCredentials::Amazon(credentials) = credentials else {
            return Err(SyncError::Validation(
                "Amazon sync requires Amazon credentials".into(),
            ));
        };

        match self.data_source {
            DataSource::Fixture => {
                tracing::info!("Using Amazon fixture orders");
                Ok(fixtures::amazon_orders(Utc::now(), window))
            }
            DataSource::Live => self.fetch_live(credentials, window).await,
        }
    }
}

// ============================================================================
// Request/Response structures for Amazon SP-API
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenResponse {
    #[serde(default)]
    pub access_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AmazonOrdersResponse {
    pub payload: AmazonOrdersPayload,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AmazonOrdersPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub orders: Vec<AmazonOrder>,
    #[serde(default)]
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AmazonOrder {
    #[serde(deserialize_with = "null_as_default")]
    pub amazon_order_id: String,
    pub purchase_date: Option<String>,
    pub last_update_date: Option<String>,
    pub order_status: Option<String>,
    pub order_total: Option<AmazonMoney>,
    pub payment_method: Option<String>,
    pub shipping_address: Option<AmazonAddress>,
    pub buyer_info: Option<AmazonBuyerInfo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AmazonMoney {
    pub currency_code: Option<String>,
    /// Decimal string in the API, kept loose
    pub amount: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AmazonAddress {
    pub state_or_region: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AmazonBuyerInfo {
    pub buyer_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate, TimeZone};
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(api_base: Option<&str>) -> AmazonApiClient {
        let config = AmazonConfig {
            api_base: api_base.map(str::to_string),
            ..AmazonConfig::default()
        };
        AmazonApiClient::new(config, DataSource::Fixture, std::time::Duration::from_secs(5))
            .unwrap()
    }

    #[test]
    fn test_endpoint_for_region() {
        let c = client(None);
        assert_eq!(
            c.endpoint_for_region("na").unwrap(),
            "https://sellingpartnerapi-na.amazon.com"
        );
        assert_eq!(
            c.endpoint_for_region("").unwrap(),
            "https://sellingpartnerapi-eu.amazon.com"
        );
        assert!(matches!(
            c.endpoint_for_region("mars"),
            Err(SyncError::Validation(_))
        ));
        assert_eq!(
            client(Some("http://localhost:9000/")).endpoint_for_region("na").unwrap(),
            "http://localhost:9000"
        );
    }

    #[test]
    fn test_created_before_is_clamped_to_now() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let window = DayWindow::from_days(day, day, utc);
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();

        let (after, before) = created_bounds(&window, now).unwrap();
        assert_eq!(after, Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap());
        assert_eq!(before, Utc.with_ymd_and_hms(2024, 3, 10, 11, 58, 0).unwrap());

        let earlier = Utc.with_ymd_and_hms(2024, 3, 9, 8, 0, 0).unwrap();
        assert!(created_bounds(&window, earlier).is_none());
    }

    #[test]
    fn test_parses_orders_payload() {
        let body = r#"{
            "payload": {
                "Orders": [{
                    "AmazonOrderId": "402-1",
                    "PurchaseDate": "2024-01-10T10:00:00Z",
                    "OrderStatus": "Shipped",
                    "OrderTotal": {"CurrencyCode": "INR", "Amount": "2499.00"},
                    "PaymentMethod": "COD",
                    "ShippingAddress": {"StateOrRegion": "Maharashtra"}
                }],
                "NextToken": "abc"
            }
        }"#;
        let payload = serde_json::from_str::<AmazonOrdersResponse>(body)
            .unwrap()
            .payload;
        assert_eq!(payload.orders.len(), 1);
        assert_eq!(payload.orders[0].amazon_order_id, "402-1");
        assert_eq!(payload.next_token.as_deref(), Some("abc"));
        assert!(payload.orders[0].buyer_info.is_none());
    }

    #[tokio::test]
    async fn test_rejects_foreign_credentials() {
        let c = client(None);
        let creds = MarketplaceCredentials::Flipkart(Default::default());
        let window = DayWindow::from_days(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            FixedOffset::east_opt(0).unwrap(),
        );
        assert!(matches!(
            c.fetch_orders(&creds, &window).await,
            Err(SyncError::Validation(_))
        ));
    }

    #[test]
    fn test_null_order_id_keeps_the_page() {
        let body = r#"{
            "payload": {
                "Orders": [
                    {"AmazonOrderId": null, "OrderStatus": "Shipped"},
                    {"AmazonOrderId": "402-2", "OrderStatus": "Pending"}
                ],
                "NextToken": null
            }
        }"#;
        let payload = serde_json::from_str::<AmazonOrdersResponse>(body)
            .unwrap()
            .payload;
        assert_eq!(payload.orders.len(), 2);
        assert_eq!(payload.orders[0].amazon_order_id, "");
        assert_eq!(payload.orders[1].amazon_order_id, "402-2");
        assert!(payload.next_token.is_none());
    }

    fn live_client(server: &MockServer, timeout: std::time::Duration) -> AmazonApiClient {
        let config = AmazonConfig {
            token_url: format!("{}/auth/o2/token", server.uri()),
            api_base: Some(server.uri()),
            ..AmazonConfig::default()
        };
        AmazonApiClient::new(config, DataSource::Live, timeout).unwrap()
    }

    fn credentials() -> MarketplaceCredentials {
        MarketplaceCredentials::Amazon(AmazonCredentials {
            seller_id: "SELLER".into(),
            refresh_token: "refresh".into(),
            client_id: "client".into(),
            client_secret: "secret".into(),
            region: String::new(),
        })
    }

    fn january() -> DayWindow {
        DayWindow::from_days(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            FixedOffset::east_opt(330 * 60).unwrap(),
        )
    }

    async fn mount_token(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/auth/o2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "tok"})))
            .mount(server)
            .await;
    }

    async fn fetch_with_orders_response(response: ResponseTemplate) -> Result<Vec<RawOrder>, SyncError> {
        let server = MockServer::start().await;
        mount_token(&server).await;
        Mock::given(method("GET"))
            .and(path("/orders/v0/orders"))
            .respond_with(response)
            .mount(&server)
            .await;
        live_client(&server, std::time::Duration::from_secs(5))
            .fetch_orders(&credentials(), &january())
            .await
    }

    #[tokio::test]
    async fn test_token_rejection_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/o2/token"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid_grant"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/orders/v0/orders"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let result = live_client(&server, std::time::Duration::from_secs(5))
            .fetch_orders(&credentials(), &january())
            .await;
        assert!(matches!(result, Err(SyncError::Auth(_))));
    }

    #[tokio::test]
    async fn test_orders_status_classification() {
        let bad_filter = fetch_with_orders_response(ResponseTemplate::new(400)).await;
        assert!(matches!(bad_filter, Err(SyncError::Validation(_))));

        let unauthorized = fetch_with_orders_response(ResponseTemplate::new(401)).await;
        assert!(matches!(unauthorized, Err(SyncError::Auth(_))));

        let forbidden = fetch_with_orders_response(ResponseTemplate::new(403)).await;
        assert!(matches!(forbidden, Err(SyncError::Auth(_))));

        let unavailable = fetch_with_orders_response(ResponseTemplate::new(503)).await;
        assert!(matches!(unavailable, Err(SyncError::Fetch(_))));
    }

    #[tokio::test]
    async fn test_unparsable_orders_body_is_fetch_error() {
        let result =
            fetch_with_orders_response(ResponseTemplate::new(200).set_body_string("<html>")).await;
        assert!(matches!(result, Err(SyncError::Fetch(_))));
    }

    #[tokio::test]
    async fn test_timeout_is_fetch_error() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        Mock::given(method("GET"))
            .and(path("/orders/v0/orders"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"payload": {"Orders": []}}))
                    .set_delay(std::time::Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let result = live_client(&server, std::time::Duration::from_millis(100))
            .fetch_orders(&credentials(), &january())
            .await;
        match result {
            Err(SyncError::Fetch(msg)) => assert!(msg.contains("timed out")),
            other => panic!("expected fetch timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_follows_next_token() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        Mock::given(method("GET"))
            .and(path("/orders/v0/orders"))
            .and(header("x-amz-access-token", "tok"))
            .and(query_param("MaxResultsPerPage", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "payload": {
                    "Orders": [{"AmazonOrderId": "402-1", "OrderStatus": "Shipped"}],
                    "NextToken": "page-2"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/orders/v0/orders"))
            .and(query_param("NextToken", "page-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "payload": {
                    "Orders": [{"AmazonOrderId": "402-2", "OrderStatus": "Unshipped"}]
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let orders = live_client(&server, std::time::Duration::from_secs(5))
            .fetch_orders(&credentials(), &january())
            .await
            .unwrap();
        let ids: Vec<&str> = orders.iter().map(RawOrder::order_id).collect();
        assert_eq!(ids, vec!["402-1", "402-2"]);
    }
}

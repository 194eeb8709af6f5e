use super::adapter::{http_client, null_as_default, MarketplaceAdapter, RawOrder};
use super::error::SyncError;
use super::fixtures;
use crate::shared::config::{DataSource, FlipkartConfig};
use crate::shared::dates::DayWindow;
use anyhow::Result;
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use chrono::{SecondsFormat, Utc};
use contracts::enums::marketplace_type::MarketplaceType;
use contracts::usecases::u501_sync_orders::{FlipkartCredentials, MarketplaceCredentials};
use serde::{Deserialize, Serialize};

/// Order item states requested from the search endpoint
pub const ACTIVE_ORDER_STATES: &[&str] = &[
    "APPROVED",
    "PACKED",
    "READY_TO_DISPATCH",
    "SHIPPED",
    "DELIVERED",
];

const MAX_PAGES: usize = 100;

/// HTTP client for the Flipkart Seller API
pub struct FlipkartApiClient {
    client: reqwest::Client,
    config: FlipkartConfig,
    data_source: DataSource,
}

impl FlipkartApiClient {
    pub fn new(
        config: FlipkartConfig,
        data_source: DataSource,
        timeout: std::time::Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            config,
            data_source,
        })
    }

    fn api_base(&self) -> &str {
        self.config.api_base.trim_end_matches('/')
    }

    /// Client-credentials grant with the application id/secret
    pub async fn fetch_access_token(
        &self,
        credentials: &FlipkartCredentials,
    ) -> Result<String, SyncError> {
        let basic = general_purpose::STANDARD.encode(format!(
            "{}:{}",
            credentials.app_id, credentials.app_secret
        ));
        let url = format!("{}/oauth/token", self.api_base());
        tracing::debug!("POST {} Authorization: Basic ****", url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Basic {}", basic))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body("grant_type=client_credentials&scope=Seller_Api")
            .send()
            .await
            .map_err(|e| SyncError::from_transport("Flipkart token request", &e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Flipkart token request failed with status {}: {}", status, body);
            return Err(SyncError::Auth(format!(
                "Failed to get Flipkart access token (HTTP {})",
                status.as_u16()
            )));
        }

        let token: FlipkartTokenResponse = response
            .json()
            .await
            .map_err(|e| SyncError::Auth(format!("Invalid Flipkart token response: {}", e)))?;

        if token.access_token.trim().is_empty() {
            return Err(SyncError::Auth("Flipkart returned an empty access token".into()));
        }
        Ok(token.access_token)
    }

    async fn read_search_response(
        &self,
        response: reqwest::Response,
    ) -> Result<FlipkartSearchResponse, SyncError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Flipkart order search failed with status {}: {}", status, body);
            return Err(match status.as_u16() {
                400 => SyncError::Validation(format!("Flipkart rejected the order filter: {}", body)),
                401 | 403 => SyncError::Auth(format!(
                    "Flipkart rejected the access token (HTTP {})",
                    status.as_u16()
                )),
                code => SyncError::Fetch(format!("Failed to fetch Flipkart orders (HTTP {})", code)),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| SyncError::from_transport("Flipkart order search response", &e))?;

        serde_json::from_str::<FlipkartSearchResponse>(&body).map_err(|e| {
            let preview: String = body.chars().take(500).collect();
            tracing::error!("Failed to parse Flipkart search response: {}. Body: {}", e, preview);
            SyncError::Fetch(format!("Failed to parse Flipkart search response: {}", e))
        })
    }

    /// First page: POST /orders/search with the filter
    pub async fn search_orders(
        &self,
        access_token: &str,
        request: &FlipkartSearchRequest,
    ) -> Result<FlipkartSearchResponse, SyncError> {
        let url = format!("{}/orders/search", self.api_base());
        tracing::debug!("POST {} Authorization: Bearer ****", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(access_token)
            .json(request)
            .send()
            .await
            .map_err(|e| SyncError::from_transport("Flipkart order search", &e))?;

        self.read_search_response(response).await
    }

    /// Next pages: GET the `nextPageUrl` returned by the previous page
    pub async fn search_next_page(
        &self,
        access_token: &str,
        next_page_url: &str,
    ) -> Result<FlipkartSearchResponse, SyncError> {
        let url = if next_page_url.starts_with("http") {
            next_page_url.to_string()
        } else {
            format!("{}{}", self.api_base(), next_page_url)
        };
        tracing::debug!("GET {} Authorization: Bearer ****", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| SyncError::from_transport("Flipkart order search", &e))?;

        self.read_search_response(response).await
    }

    async fn fetch_live(
        &self,
        credentials: &FlipkartCredentials,
        window: &DayWindow,
    ) -> Result<Vec<RawOrder>, SyncError> {
        let access_token = self.fetch_access_token(credentials).await?;
        let request = FlipkartSearchRequest::for_window(window);

        let mut page = self.search_orders(&access_token, &request).await?;
        let mut orders = Vec::new();
        let mut page_no = 1;
        loop {
            tracing::info!(
                "Flipkart orders page {}: {} items, more: {}",
                page_no,
                page.order_items.len(),
                page.has_more
            );
            orders.extend(page.order_items.into_iter().map(RawOrder::Flipkart));

            let next = match page.next_page_url {
                Some(next) if page.has_more && !next.is_empty() => next,
                _ => return Ok(orders),
            };
            if page_no >= MAX_PAGES {
                tracing::warn!("Flipkart pagination stopped after {} pages", MAX_PAGES);
                return Ok(orders);
            }
            page = self.search_next_page(&access_token, &next).await?;
            page_no += 1;
        }
    }
}

#[async_trait]
impl MarketplaceAdapter for FlipkartApiClient {
    fn marketplace(&self) -> MarketplaceType {
        MarketplaceType::Flipkart
    }

    async fn fetch_orders(
        &self,
        credentials: &MarketplaceCredentials,
        window: &DayWindow,
    ) -> Result<Vec<RawOrder>, SyncError> {
        let MarketplaceCredentials::Flipkart(credentials) = credentials else {
            return Err(SyncError::Validation(
                "Flipkart sync requires Flipkart credentials".into(),
            ));
        };

        match self.data_source {
            DataSource::Fixture => {
                tracing::info!("Using Flipkart fixture orders");
                Ok(fixtures::flipkart_orders(Utc::now(), window))
            }
            DataSource::Live => self.fetch_live(credentials, window).await,
        }
    }
}

// ============================================================================
// Request/Response structures for Flipkart Seller API
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct FlipkartTokenResponse {
    #[serde(default)]
    pub access_token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlipkartSearchRequest {
    pub filter: FlipkartSearchFilter,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlipkartSearchFilter {
    pub states: Vec<String>,
    pub order_date: FlipkartDateRange,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlipkartDateRange {
    pub from_date: String,
    pub to_date: String,
}

impl FlipkartSearchRequest {
    pub fn for_window(window: &DayWindow) -> Self {
        Self {
            filter: FlipkartSearchFilter {
                states: ACTIVE_ORDER_STATES.iter().map(|s| s.to_string()).collect(),
                order_date: FlipkartDateRange {
                    from_date: window
                        .start_utc()
                        .to_rfc3339_opts(SecondsFormat::Millis, true),
                    to_date: window
                        .end_utc_inclusive()
                        .to_rfc3339_opts(SecondsFormat::Millis, true),
                },
            },
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlipkartSearchResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub order_items: Vec<FlipkartOrderItem>,
    #[serde(deserialize_with = "null_as_default")]
    pub has_more: bool,
    pub next_page_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlipkartOrderItem {
    #[serde(deserialize_with = "null_as_default")]
    pub order_id: String,
    pub order_item_id: Option<String>,
    pub order_date: Option<String>,
    pub price_components: Option<FlipkartPriceComponents>,
    pub order_item_status: Option<String>,
    pub payment_type: Option<String>,
    pub shipping_address: Option<FlipkartAddress>,
    pub delivery_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlipkartPriceComponents {
    pub selling_price: Option<serde_json::Value>,
    pub total_price: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlipkartAddress {
    pub name: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate};
    use serde_json::json;
    use wiremock::matchers::{basic_auth, bearer_token, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_search_request_covers_whole_end_day() {
        let ist = FixedOffset::east_opt(330 * 60).unwrap();
        let window = DayWindow::from_days(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            ist,
        );
        let request = FlipkartSearchRequest::for_window(&window);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["filter"]["orderDate"]["fromDate"], "2023-12-31T18:30:00.000Z");
        assert_eq!(json["filter"]["orderDate"]["toDate"], "2024-01-31T18:29:59.000Z");
        assert_eq!(json["filter"]["states"][0], "APPROVED");
        assert_eq!(json["filter"]["states"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_parses_search_page() {
        let body = r#"{
            "orderItems": [{
                "orderId": "OD1",
                "orderDate": "2024-01-10",
                "priceComponents": {"sellingPrice": 1599},
                "orderItemStatus": "SHIPPED",
                "paymentType": "PREPAID",
                "shippingAddress": {"name": "A", "state": "Telangana"}
            }],
            "hasMore": true,
            "nextPageUrl": "/v2/orders/search?page=2"
        }"#;
        let page: FlipkartSearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(page.order_items.len(), 1);
        assert!(page.has_more);
        assert_eq!(page.next_page_url.as_deref(), Some("/v2/orders/search?page=2"));
        assert!(page.order_items[0].delivery_date.is_none());
    }

    #[test]
    fn test_empty_page_defaults() {
        let page: FlipkartSearchResponse = serde_json::from_str("{}").unwrap();
        assert!(page.order_items.is_empty());
        assert!(!page.has_more);
    }

    #[test]
    fn test_null_order_id_keeps_the_page() {
        let body = r#"{
            "orderItems": [
                {"orderId": "OD1", "orderItemStatus": "SHIPPED"},
                {"orderId": null, "orderItemStatus": "APPROVED"}
            ],
            "hasMore": null,
            "nextPageUrl": null
        }"#;
        let page: FlipkartSearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(page.order_items.len(), 2);
        assert_eq!(page.order_items[1].order_id, "");
        assert!(!page.has_more);
    }

    fn live_client(server: &MockServer) -> FlipkartApiClient {
        let config = FlipkartConfig {
            api_base: server.uri(),
        };
        FlipkartApiClient::new(config, DataSource::Live, std::time::Duration::from_secs(5))
            .unwrap()
    }

    fn credentials() -> MarketplaceCredentials {
        MarketplaceCredentials::Flipkart(FlipkartCredentials {
            app_id: "app".into(),
            app_secret: "secret".into(),
        })
    }

    fn january() -> DayWindow {
        DayWindow::from_days(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            FixedOffset::east_opt(330 * 60).unwrap(),
        )
    }

    fn item(order_id: &str) -> serde_json::Value {
        json!({"orderId": order_id, "orderItemStatus": "APPROVED", "paymentType": "COD"})
    }

    async fn mount_token(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(basic_auth("app", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "tok"})))
            .mount(server)
            .await;
    }

    async fn search_with_response(response: ResponseTemplate) -> Result<Vec<RawOrder>, SyncError> {
        let server = MockServer::start().await;
        mount_token(&server).await;
        Mock::given(method("POST"))
            .and(path("/orders/search"))
            .respond_with(response)
            .mount(&server)
            .await;
        live_client(&server).fetch_orders(&credentials(), &january()).await
    }

    #[tokio::test]
    async fn test_token_rejection_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/orders/search"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let result = live_client(&server).fetch_orders(&credentials(), &january()).await;
        assert!(matches!(result, Err(SyncError::Auth(_))));
    }

    #[tokio::test]
    async fn test_search_status_classification() {
        let bad_filter = search_with_response(ResponseTemplate::new(400)).await;
        assert!(matches!(bad_filter, Err(SyncError::Validation(_))));

        let unauthorized = search_with_response(ResponseTemplate::new(401)).await;
        assert!(matches!(unauthorized, Err(SyncError::Auth(_))));

        let forbidden = search_with_response(ResponseTemplate::new(403)).await;
        assert!(matches!(forbidden, Err(SyncError::Auth(_))));

        let server_error = search_with_response(ResponseTemplate::new(500)).await;
        assert!(matches!(server_error, Err(SyncError::Fetch(_))));

        let garbage =
            search_with_response(ResponseTemplate::new(200).set_body_string("not json")).await;
        assert!(matches!(garbage, Err(SyncError::Fetch(_))));
    }

    #[tokio::test]
    async fn test_follows_next_page_url() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        Mock::given(method("POST"))
            .and(path("/orders/search"))
            .and(bearer_token("tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "orderItems": [item("OD1"), item("OD2")],
                "hasMore": true,
                "nextPageUrl": "/orders/search?page=2"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/orders/search"))
            .and(query_param("page", "2"))
            .and(bearer_token("tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "orderItems": [item("OD3")],
                "hasMore": false
            })))
            .expect(1)
            .mount(&server)
            .await;

        let orders = live_client(&server)
            .fetch_orders(&credentials(), &january())
            .await
            .unwrap();
        let ids: Vec<&str> = orders.iter().map(RawOrder::order_id).collect();
        assert_eq!(ids, vec!["OD1", "OD2", "OD3"]);
    }

    #[tokio::test]
    async fn test_pagination_cap_keeps_every_fetched_page() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        let endless = json!({
            "orderItems": [item("OD")],
            "hasMore": true,
            "nextPageUrl": "/orders/search?page=next"
        });
        Mock::given(method("POST"))
            .and(path("/orders/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(endless.clone()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/orders/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(endless))
            .expect((MAX_PAGES - 1) as u64)
            .mount(&server)
            .await;

        let orders = live_client(&server)
            .fetch_orders(&credentials(), &january())
            .await
            .unwrap();
        assert_eq!(orders.len(), MAX_PAGES);
    }
}

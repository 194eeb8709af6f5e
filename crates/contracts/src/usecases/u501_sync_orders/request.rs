use crate::enums::marketplace_type::MarketplaceType;
use serde::{Deserialize, Serialize};

/// Sync run request. Dates are "YYYY-MM-DD", both ends inclusive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest<C> {
    /// Missing object parses as empty credentials and fails field validation
    #[serde(default)]
    pub credentials: C,
    #[serde(default = "default_start_date")]
    pub start_date: String,
    #[serde(default = "default_end_date")]
    pub end_date: String,
}

impl<C> SyncRequest<C> {
    pub fn map_credentials<D>(self, f: impl FnOnce(C) -> D) -> SyncRequest<D> {
        SyncRequest {
            credentials: f(self.credentials),
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

fn default_start_date() -> String {
    (chrono::Utc::now().date_naive() - chrono::Duration::days(30))
        .format("%Y-%m-%d")
        .to_string()
}

fn default_end_date() -> String {
    chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Amazon SP-API credentials (Login with Amazon refresh-token grant)
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AmazonCredentials {
    pub seller_id: String,
    pub refresh_token: String,
    pub client_id: String,
    pub client_secret: String,
    /// SP-API region: "na", "eu" or "fe"
    pub region: String,
}

/// Flipkart Seller API application credentials
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlipkartCredentials {
    pub app_id: String,
    pub app_secret: String,
}

impl std::fmt::Debug for AmazonCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AmazonCredentials")
            .field("seller_id", &self.seller_id)
            .field("refresh_token", &"****")
            .field("client_id", &self.client_id)
            .field("client_secret", &"****")
            .field("region", &self.region)
            .finish()
    }
}

impl std::fmt::Debug for FlipkartCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlipkartCredentials")
            .field("app_id", &self.app_id)
            .field("app_secret", &"****")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub enum MarketplaceCredentials {
    Amazon(AmazonCredentials),
    Flipkart(FlipkartCredentials),
}

impl MarketplaceCredentials {
    pub fn marketplace(&self) -> MarketplaceType {
        match self {
            MarketplaceCredentials::Amazon(_) => MarketplaceType::Amazon,
            MarketplaceCredentials::Flipkart(_) => MarketplaceType::Flipkart,
        }
    }

    /// Names of required fields that are empty or whitespace
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let required: Vec<(&'static str, &str)> = match self {
            MarketplaceCredentials::Amazon(c) => vec![
                ("sellerId", c.seller_id.as_str()),
                ("refreshToken", c.refresh_token.as_str()),
                ("clientId", c.client_id.as_str()),
                ("clientSecret", c.client_secret.as_str()),
            ],
            MarketplaceCredentials::Flipkart(c) => vec![
                ("appId", c.app_id.as_str()),
                ("appSecret", c.app_secret.as_str()),
            ],
        };
        required
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
            .collect()
    }
}

impl From<AmazonCredentials> for MarketplaceCredentials {
    fn from(c: AmazonCredentials) -> Self {
        MarketplaceCredentials::Amazon(c)
    }
}

impl From<FlipkartCredentials> for MarketplaceCredentials {
    fn from(c: FlipkartCredentials) -> Self {
        MarketplaceCredentials::Flipkart(c)
    }
}

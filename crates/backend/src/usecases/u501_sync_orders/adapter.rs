use super::amazon_api_client::{AmazonApiClient, AmazonOrder};
use super::error::SyncError;
use super::flipkart_api_client::{FlipkartApiClient, FlipkartOrderItem};
use crate::shared::config::Config;
use crate::shared::dates::DayWindow;
use anyhow::Result;
use async_trait::async_trait;
use contracts::enums::marketplace_type::MarketplaceType;
use contracts::usecases::u501_sync_orders::MarketplaceCredentials;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// A marketplace-native order as returned by an adapter
#[derive(Debug, Clone)]
pub enum RawOrder {
    Amazon(AmazonOrder),
    Flipkart(FlipkartOrderItem),
}

impl RawOrder {
    pub fn order_id(&self) -> &str {
        match self {
            RawOrder::Amazon(o) => &o.amazon_order_id,
            RawOrder::Flipkart(o) => &o.order_id,
        }
    }
}

/// Fetches raw orders from one marketplace.
///
/// Credentials are exchanged for a bearer token first and never sent to
/// the order search endpoint. Implementations keep no mutable state.
#[async_trait]
pub trait MarketplaceAdapter: Send + Sync {
    fn marketplace(&self) -> MarketplaceType;

    /// Orders placed inside `window` that are in an active state
    async fn fetch_orders(
        &self,
        credentials: &MarketplaceCredentials,
        window: &DayWindow,
    ) -> Result<Vec<RawOrder>, SyncError>;
}

/// Reads an explicit JSON `null` as the type's default
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + serde::Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// Build the adapter for a marketplace from configuration
pub fn adapter_for(
    marketplace: MarketplaceType,
    config: &Config,
) -> Result<Arc<dyn MarketplaceAdapter>> {
    let timeout = Duration::from_secs(config.sync.request_timeout_secs);
    let data_source = config.sync.data_source;
    let adapter: Arc<dyn MarketplaceAdapter> = match marketplace {
        MarketplaceType::Amazon => Arc::new(AmazonApiClient::new(
            config.amazon.clone(),
            data_source,
            timeout,
        )?),
        MarketplaceType::Flipkart => Arc::new(FlipkartApiClient::new(
            config.flipkart.clone(),
            data_source,
            timeout,
        )?),
    };
    Ok(adapter)
}

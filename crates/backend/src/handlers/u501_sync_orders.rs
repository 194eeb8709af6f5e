use axum::Json;
use contracts::enums::marketplace_type::MarketplaceType;
use contracts::usecases::u501_sync_orders::{
    AmazonCredentials, FlipkartCredentials, MarketplaceCredentials, SyncRequest, SyncResponse,
};
use once_cell::sync::{Lazy, OnceCell};
use std::sync::Arc;

use super::{api_error, internal_error, order_store, ApiError};
use crate::shared::config::get_config;
use crate::system::auth::extractor::CurrentUser;
use crate::usecases::u501_sync_orders::{adapter_for, MarketplaceAdapter, SyncExecutor};

static SYNC_EXECUTOR: Lazy<SyncExecutor> = Lazy::new(|| {
    let config = get_config();
    SyncExecutor::new(order_store(), &config.sync, config.reporting.offset())
});

static AMAZON_ADAPTER: OnceCell<Arc<dyn MarketplaceAdapter>> = OnceCell::new();
static FLIPKART_ADAPTER: OnceCell<Arc<dyn MarketplaceAdapter>> = OnceCell::new();

fn adapter(marketplace: MarketplaceType) -> anyhow::Result<Arc<dyn MarketplaceAdapter>> {
    let cell = match marketplace {
        MarketplaceType::Amazon => &AMAZON_ADAPTER,
        MarketplaceType::Flipkart => &FLIPKART_ADAPTER,
    };
    cell.get_or_try_init(|| adapter_for(marketplace, get_config()))
        .cloned()
}

async fn run_sync(
    user: &CurrentUser,
    marketplace: MarketplaceType,
    request: SyncRequest<MarketplaceCredentials>,
) -> Result<Json<SyncResponse>, ApiError> {
    let adapter = adapter(marketplace)
        .map_err(|e| internal_error("Failed to create marketplace client", e))?;

    match SYNC_EXECUTOR
        .sync(user.user_id(), adapter.as_ref(), request)
        .await
    {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            tracing::error!("{} sync failed for user {}: {}", marketplace, user.user_id(), e);
            Err(api_error(e))
        }
    }
}

/// POST /api/u501/sync/amazon
pub async fn amazon_sync(
    user: CurrentUser,
    Json(request): Json<SyncRequest<AmazonCredentials>>,
) -> Result<Json<SyncResponse>, ApiError> {
    let request = request.map_credentials(MarketplaceCredentials::from);
    run_sync(&user, MarketplaceType::Amazon, request).await
}

/// POST /api/u501/sync/flipkart
pub async fn flipkart_sync(
    user: CurrentUser,
    Json(request): Json<SyncRequest<FlipkartCredentials>>,
) -> Result<Json<SyncResponse>, ApiError> {
    let request = request.map_credentials(MarketplaceCredentials::from);
    run_sync(&user, MarketplaceType::Flipkart, request).await
}

use super::adapter::{MarketplaceAdapter, RawOrder};
use super::error::SyncError;
use super::processors;
use crate::domain::a001_order::OrderStore;
use crate::shared::config::{SyncConfig, SyncMode};
use crate::shared::dates::DayWindow;
use chrono::{FixedOffset, Utc};
use contracts::domain::a001_order::aggregate::{Order, OrderId, OrderPatch};
use contracts::enums::marketplace_type::MarketplaceType;
use contracts::usecases::common::UseCaseMetadata;
use contracts::usecases::u501_sync_orders::{
    MarketplaceCredentials, RecordError, SyncOrders, SyncRequest, SyncResponse,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// One record ready to be written; `existing` is set in merge mode when
/// the user already has this (account, orderId)
struct PersistPlan {
    order: Order,
    existing: Option<OrderId>,
}

type PersistOutcome = (usize, String, anyhow::Result<()>);

/// Executor for the order sync use case:
/// validate → fetch → normalize → persist → report
pub struct SyncExecutor {
    store: Arc<dyn OrderStore>,
    persist_concurrency: usize,
    mode: SyncMode,
    offset: FixedOffset,
}

impl SyncExecutor {
    pub fn new(store: Arc<dyn OrderStore>, config: &SyncConfig, offset: FixedOffset) -> Self {
        Self {
            store,
            persist_concurrency: config.persist_concurrency.max(1),
            mode: config.mode,
            offset,
        }
    }

    /// Check credentials and dates before any network call
    pub fn validate(
        &self,
        marketplace: MarketplaceType,
        request: &SyncRequest<MarketplaceCredentials>,
    ) -> Result<DayWindow, SyncError> {
        if request.credentials.marketplace() != marketplace {
            return Err(SyncError::Validation(format!(
                "{} credentials cannot be used for a {} sync",
                request.credentials.marketplace(),
                marketplace
            )));
        }

        let missing = request.credentials.missing_fields();
        if !missing.is_empty() {
            return Err(SyncError::Validation(format!(
                "Missing {} credentials: {}",
                marketplace,
                missing.join(", ")
            )));
        }

        DayWindow::parse(&request.start_date, &request.end_date, self.offset)
            .map_err(SyncError::Validation)
    }

    /// Run one sync. Fails only on validation or fetch; per-record persist
    /// failures are reported in the response.
    pub async fn sync(
        &self,
        user_id: &str,
        adapter: &dyn MarketplaceAdapter,
        request: SyncRequest<MarketplaceCredentials>,
    ) -> Result<SyncResponse, SyncError> {
        let marketplace = adapter.marketplace();
        let window = self.validate(marketplace, &request)?;

        tracing::info!(
            "{}: starting {} sync for user {}: {} .. {}",
            SyncOrders::full_name(),
            marketplace,
            user_id,
            request.start_date,
            request.end_date
        );

        let raw_orders = adapter.fetch_orders(&request.credentials, &window).await?;
        tracing::info!("Fetched {} {} orders", raw_orders.len(), marketplace);

        let synced_at = Utc::now().timestamp_millis();
        let plans = self
            .plan(user_id, marketplace, &raw_orders, synced_at)
            .await;

        let outcomes = if self.persist_concurrency > 1 {
            self.persist_concurrent(plans).await
        } else {
            self.persist_sequential(plans).await
        };

        let mut response = SyncResponse::default();
        for (_, order_id, result) in outcomes {
            match result {
                Ok(()) => response.imported_count += 1,
                Err(e) => {
                    let err = SyncError::Persist(e.to_string());
                    tracing::warn!("{} order {}: {}", marketplace, order_id, err);
                    response.errors.push(RecordError {
                        order_id,
                        message: err.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            "{} sync finished for user {}: {} imported, {} failed",
            marketplace,
            user_id,
            response.imported_count,
            response.errors.len()
        );
        Ok(response)
    }

    async fn plan(
        &self,
        user_id: &str,
        marketplace: MarketplaceType,
        raw_orders: &[RawOrder],
        synced_at: i64,
    ) -> Vec<PersistPlan> {
        let existing = match self.mode {
            SyncMode::Append => HashMap::new(),
            SyncMode::Merge => self.existing_ids(user_id, marketplace).await,
        };

        raw_orders
            .iter()
            .map(|raw| {
                let order = Order::from_normalized(processors::normalize(raw), user_id, synced_at);
                let existing = existing.get(&order.order_id).copied();
                PersistPlan { order, existing }
            })
            .collect()
    }

    /// orderId → stored id for the user's orders from this marketplace
    async fn existing_ids(
        &self,
        user_id: &str,
        marketplace: MarketplaceType,
    ) -> HashMap<String, OrderId> {
        match self.store.query(user_id).await {
            Ok(orders) => orders
                .into_iter()
                .filter(|o| o.account == marketplace)
                .filter_map(|o| o.id.map(|id| (o.order_id, id)))
                .collect(),
            Err(e) => {
                tracing::warn!(
                    "Could not load existing orders for user {}, inserting all: {}",
                    user_id,
                    e
                );
                HashMap::new()
            }
        }
    }

    async fn persist_sequential(&self, plans: Vec<PersistPlan>) -> Vec<PersistOutcome> {
        let mut outcomes = Vec::with_capacity(plans.len());
        for (index, plan) in plans.into_iter().enumerate() {
            let result = persist_one(self.store.as_ref(), &plan).await;
            outcomes.push((index, plan.order.order_id, result));
        }
        outcomes
    }

    /// At most `persist_concurrency` writes in flight. Dropping the returned
    /// future drops the JoinSet, which aborts the remaining tasks.
    async fn persist_concurrent(&self, plans: Vec<PersistPlan>) -> Vec<PersistOutcome> {
        let semaphore = Arc::new(Semaphore::new(self.persist_concurrency));
        let mut tasks = JoinSet::new();

        for (index, plan) in plans.into_iter().enumerate() {
            let store = Arc::clone(&self.store);
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let result = persist_one(store.as_ref(), &plan).await;
                (index, plan.order.order_id, result)
            });
        }

        let mut outcomes = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => outcomes.push((
                    usize::MAX,
                    "unknown".to_string(),
                    Err(anyhow::anyhow!("persist task failed: {}", e)),
                )),
            }
        }
        outcomes.sort_by_key(|(index, _, _)| *index);
        outcomes
    }
}

async fn persist_one(store: &dyn OrderStore, plan: &PersistPlan) -> anyhow::Result<()> {
    match plan.existing {
        Some(id) => store.update(id, &OrderPatch::from_order(&plan.order)).await,
        None => store.insert(&plan.order).await.map(|_| ()),
    }
}

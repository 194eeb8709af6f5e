use anyhow::Result;
use async_trait::async_trait;
use contracts::domain::a001_order::aggregate::{Order, OrderId, OrderPatch};

/// Persistent document store for orders, scoped by user
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// All orders of a user, newest first
    async fn query(&self, user_id: &str) -> Result<Vec<Order>>;

    /// Persist a new order and return its assigned id
    async fn insert(&self, order: &Order) -> Result<OrderId>;

    /// Apply a partial update to an existing order
    async fn update(&self, id: OrderId, patch: &OrderPatch) -> Result<()>;
}

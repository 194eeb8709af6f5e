use super::store::OrderStore;
use anyhow::Result;
use contracts::domain::a001_order::aggregate::{
    Order, OrderId, OrderPatch, OrderStatus, PaymentType,
};

/// Orders list filter; empty fields match everything
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    /// Case-insensitive substring of order id, customer or state
    pub search: Option<String>,
    pub status: Option<OrderStatus>,
    pub payment_type: Option<PaymentType>,
}

impl OrderFilter {
    pub fn matches(&self, order: &Order) -> bool {
        if let Some(status) = self.status {
            if order.status != status {
                return false;
            }
        }
        if let Some(payment_type) = self.payment_type {
            if order.payment_type != payment_type {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                [&order.order_id, &order.customer_name, &order.state]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&term))
            }
            _ => true,
        }
    }
}

pub fn filter_orders(orders: Vec<Order>, filter: &OrderFilter) -> Vec<Order> {
    orders.into_iter().filter(|o| filter.matches(o)).collect()
}

pub async fn list_for_user(
    store: &dyn OrderStore,
    user_id: &str,
    filter: &OrderFilter,
) -> Result<Vec<Order>> {
    let orders = store.query(user_id).await?;
    Ok(filter_orders(orders, filter))
}

/// Change the status of one of the user's orders.
/// Returns `None` when the user has no order with that id.
pub async fn update_status(
    store: &dyn OrderStore,
    user_id: &str,
    id: OrderId,
    status: OrderStatus,
    now: i64,
) -> Result<Option<Order>> {
    let Some(mut order) = store
        .query(user_id)
        .await?
        .into_iter()
        .find(|o| o.id == Some(id))
    else {
        return Ok(None);
    };

    store.update(id, &OrderPatch::status_change(status, now)).await?;
    order.set_status(status, now);
    tracing::info!(
        "Order {} ({}) status set to {}",
        order.order_id,
        order.account,
        status
    );
    Ok(Some(order))
}

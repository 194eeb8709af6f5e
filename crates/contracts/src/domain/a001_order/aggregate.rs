use crate::domain::common::AggregateId;
use crate::enums::marketplace_type::MarketplaceType;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Store-assigned order identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub Uuid);

impl OrderId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl AggregateId for OrderId {
    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(OrderId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

/// Canonical fulfillment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Shipped,
    Delivered,
    Cancelled,
    #[serde(rename = "RTO")]
    Rto,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Rto => "RTO",
        }
    }

    pub fn all() -> [OrderStatus; 5] {
        [
            OrderStatus::Pending,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
            OrderStatus::Rto,
        ]
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::all().into_iter().find(|s| s.as_str() == value)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentType {
    #[serde(rename = "COD")]
    Cod,
    Prepaid,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Cod => "COD",
            PaymentType::Prepaid => "Prepaid",
        }
    }

    /// Anything that is not literally "COD" is prepaid
    pub fn parse(value: &str) -> Self {
        if value == "COD" {
            PaymentType::Cod
        } else {
            PaymentType::Prepaid
        }
    }
}

impl std::fmt::Display for PaymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Marketplace-agnostic order record.
///
/// `delivered_date` is `Some` exactly when `status` is `Delivered`.
/// `rto` and `replacement` are annotations independent of `status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Absent until persisted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<OrderId>,
    pub user_id: String,
    /// Marketplace order id, unique only per account
    pub order_id: String,
    pub account: MarketplaceType,
    /// Placement time, epoch millis
    pub date: i64,
    pub customer_name: String,
    pub amount: f64,
    pub payment_type: PaymentType,
    pub status: OrderStatus,
    pub state: String,
    pub rto: bool,
    pub replacement: bool,
    pub delivered_date: Option<i64>,
    #[serde(default)]
    pub synced_from_amazon: bool,
    #[serde(default)]
    pub synced_from_flipkart: bool,
    pub last_sync_date: i64,
}

impl Order {
    /// Build a persistable order from a normalized record.
    /// Sets the provenance flag that matches `account`.
    pub fn from_normalized(normalized: NormalizedOrder, user_id: &str, synced_at: i64) -> Self {
        Self {
            id: None,
            user_id: user_id.to_string(),
            order_id: normalized.order_id,
            account: normalized.account,
            date: normalized.date,
            customer_name: normalized.customer_name,
            amount: normalized.amount,
            payment_type: normalized.payment_type,
            status: normalized.status,
            state: normalized.state,
            rto: normalized.rto,
            replacement: normalized.replacement,
            delivered_date: normalized.delivered_date,
            synced_from_amazon: normalized.account == MarketplaceType::Amazon,
            synced_from_flipkart: normalized.account == MarketplaceType::Flipkart,
            last_sync_date: synced_at,
        }
    }

    /// Apply an explicit status change, keeping `delivered_date` consistent
    pub fn set_status(&mut self, status: OrderStatus, now: i64) {
        self.status = status;
        self.delivered_date = if status == OrderStatus::Delivered {
            Some(now)
        } else {
            None
        };
    }
}

/// Output of a marketplace normalizer: an order without user scope,
/// provenance flags or sync time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedOrder {
    pub order_id: String,
    pub account: MarketplaceType,
    pub date: i64,
    pub customer_name: String,
    pub amount: f64,
    pub payment_type: PaymentType,
    pub status: OrderStatus,
    pub state: String,
    pub rto: bool,
    pub replacement: bool,
    pub delivered_date: Option<i64>,
}

/// Partial update applied by `update(id, patch)`.
/// `None` leaves a field untouched; `delivered_date: Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPatch {
    pub date: Option<i64>,
    pub customer_name: Option<String>,
    pub amount: Option<f64>,
    pub payment_type: Option<PaymentType>,
    pub status: Option<OrderStatus>,
    pub state: Option<String>,
    pub rto: Option<bool>,
    pub replacement: Option<bool>,
    pub delivered_date: Option<Option<i64>>,
    pub last_sync_date: Option<i64>,
}

impl OrderPatch {
    /// Patch that overwrites every marketplace-derived field of an existing order
    pub fn from_order(order: &Order) -> Self {
        Self {
            date: Some(order.date),
            customer_name: Some(order.customer_name.clone()),
            amount: Some(order.amount),
            payment_type: Some(order.payment_type),
            status: Some(order.status),
            state: Some(order.state.clone()),
            rto: Some(order.rto),
            replacement: Some(order.replacement),
            delivered_date: Some(order.delivered_date),
            last_sync_date: Some(order.last_sync_date),
        }
    }

    pub fn status_change(status: OrderStatus, now: i64) -> Self {
        Self {
            status: Some(status),
            delivered_date: Some((status == OrderStatus::Delivered).then_some(now)),
            ..Default::default()
        }
    }

    pub fn apply(&self, order: &mut Order) {
        if let Some(date) = self.date {
            order.date = date;
        }
        if let Some(ref name) = self.customer_name {
            order.customer_name = name.clone();
        }
        if let Some(amount) = self.amount {
            order.amount = amount;
        }
        if let Some(payment_type) = self.payment_type {
            order.payment_type = payment_type;
        }
        if let Some(status) = self.status {
            order.status = status;
        }
        if let Some(ref state) = self.state {
            order.state = state.clone();
        }
        if let Some(rto) = self.rto {
            order.rto = rto;
        }
        if let Some(replacement) = self.replacement {
            order.replacement = replacement;
        }
        if let Some(delivered_date) = self.delivered_date {
            order.delivered_date = delivered_date;
        }
        if let Some(last_sync_date) = self.last_sync_date {
            order.last_sync_date = last_sync_date;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalized(status: OrderStatus) -> NormalizedOrder {
        NormalizedOrder {
            order_id: "OD1".into(),
            account: MarketplaceType::Flipkart,
            date: 1_704_844_800_000,
            customer_name: "A".into(),
            amount: 1599.0,
            payment_type: PaymentType::Prepaid,
            status,
            state: "Telangana".into(),
            rto: false,
            replacement: false,
            delivered_date: None,
        }
    }

    #[test]
    fn test_from_normalized_sets_matching_provenance_flag() {
        let order = Order::from_normalized(normalized(OrderStatus::Shipped), "user-1", 42);
        assert!(order.synced_from_flipkart);
        assert!(!order.synced_from_amazon);
        assert_eq!(order.user_id, "user-1");
        assert_eq!(order.last_sync_date, 42);
        assert!(order.id.is_none());
    }

    #[test]
    fn test_set_status_keeps_delivered_date_invariant() {
        let mut order = Order::from_normalized(normalized(OrderStatus::Shipped), "u", 0);
        order.set_status(OrderStatus::Delivered, 1000);
        assert_eq!(order.delivered_date, Some(1000));
        order.set_status(OrderStatus::Cancelled, 2000);
        assert_eq!(order.delivered_date, None);
    }

    #[test]
    fn test_status_change_patch_clears_delivered_date() {
        let mut order = Order::from_normalized(normalized(OrderStatus::Delivered), "u", 0);
        order.delivered_date = Some(5);
        OrderPatch::status_change(OrderStatus::Pending, 10).apply(&mut order);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.delivered_date, None);
    }

    #[test]
    fn test_wire_names_match_document_schema() {
        let order = Order::from_normalized(normalized(OrderStatus::Rto), "u", 0);
        let value = serde_json::to_value(&order).unwrap();
        assert_eq!(value["status"], "RTO");
        assert_eq!(value["paymentType"], "Prepaid");
        assert_eq!(value["account"], "Flipkart");
        assert_eq!(value["syncedFromFlipkart"], true);
        assert!(value.get("id").is_none());
    }

    #[test]
    fn test_status_parse_rejects_unknown_values() {
        assert_eq!(OrderStatus::parse("RTO"), Some(OrderStatus::Rto));
        assert_eq!(OrderStatus::parse("Returned"), None);
    }
}

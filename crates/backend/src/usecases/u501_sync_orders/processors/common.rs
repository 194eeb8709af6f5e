use crate::shared::dates::parse_marketplace_date;
use contracts::domain::a001_order::aggregate::OrderStatus;

pub const UNKNOWN_CUSTOMER: &str = "N/A";

/// Marketplace status vocabulary mapped onto the canonical statuses.
/// Lookups are exact; anything not listed falls back to `default`.
pub struct StatusTable {
    pub entries: &'static [(&'static str, OrderStatus)],
    pub default: OrderStatus,
}

impl StatusTable {
    pub fn map(&self, raw: Option<&str>) -> OrderStatus {
        raw.and_then(|raw| {
            self.entries
                .iter()
                .find(|(code, _)| *code == raw)
                .map(|(_, status)| *status)
        })
        .unwrap_or(self.default)
    }
}

/// Numeric amount from a JSON number or numeric string.
/// Missing, non-numeric, negative and non-finite values become 0.
pub fn parse_amount(value: Option<&serde_json::Value>) -> f64 {
    let amount = match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match amount {
        Some(a) if a.is_finite() && a >= 0.0 => a,
        _ => 0.0,
    }
}

pub fn customer_name(name: Option<&str>) -> String {
    match name.map(str::trim) {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => UNKNOWN_CUSTOMER.to_string(),
    }
}

/// Placement date in epoch millis; 0 when missing or unparsable
pub fn order_date_millis(order_id: &str, raw: Option<&str>) -> i64 {
    match raw.and_then(parse_marketplace_date) {
        Some(dt) => dt.timestamp_millis(),
        None => {
            tracing::warn!(
                "Order {}: unparsable order date {:?}, using epoch",
                order_id,
                raw
            );
            0
        }
    }
}

/// Delivered timestamp, only for delivered orders. Falls back to the
/// order date so a delivered order always carries one.
pub fn delivered_date_millis(
    status: OrderStatus,
    source: Option<&str>,
    order_date: i64,
) -> Option<i64> {
    if status != OrderStatus::Delivered {
        return None;
    }
    Some(
        source
            .and_then(parse_marketplace_date)
            .map(|dt| dt.timestamp_millis())
            .unwrap_or(order_date),
    )
}

//! Canned marketplace records served when `sync.data_source = "fixture"`.
//! Dates are relative to `now`; only records placed inside the window are
//! returned, matching what the live search would do.

use super::adapter::RawOrder;
use super::amazon_api_client::{AmazonAddress, AmazonBuyerInfo, AmazonMoney, AmazonOrder};
use super::flipkart_api_client::{FlipkartAddress, FlipkartOrderItem, FlipkartPriceComponents};
use crate::shared::dates::{parse_marketplace_date, DayWindow};
use chrono::{DateTime, Duration, SecondsFormat, Utc};

fn days_ago(now: DateTime<Utc>, days: i64) -> String {
    (now - Duration::days(days)).to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn in_window(date: Option<&str>, window: &DayWindow) -> bool {
    date.and_then(parse_marketplace_date)
        .map(|dt| window.contains(dt.timestamp_millis()))
        .unwrap_or(false)
}

pub fn amazon_orders(now: DateTime<Utc>, window: &DayWindow) -> Vec<RawOrder> {
    let rows = [
        ("AMZ-TEST-001", 1, "2499", "Shipped", "COD", "Maharashtra", "Rajesh Kumar"),
        ("AMZ-TEST-002", 2, "1899", "Delivered", "Prepaid", "Karnataka", "Priya Sharma"),
        ("AMZ-TEST-003", 3, "3299", "Pending", "COD", "Delhi", "Amit Patel"),
    ];

    rows.into_iter()
        .map(|(id, age, amount, status, payment, state, buyer)| AmazonOrder {
            amazon_order_id: id.to_string(),
            purchase_date: Some(days_ago(now, age)),
            last_update_date: Some(days_ago(now, 0)),
            order_status: Some(status.to_string()),
            order_total: Some(AmazonMoney {
                currency_code: Some("INR".to_string()),
                amount: Some(serde_json::Value::String(amount.to_string())),
            }),
            payment_method: Some(payment.to_string()),
            shipping_address: Some(AmazonAddress {
                state_or_region: Some(state.to_string()),
                city: None,
            }),
            buyer_info: Some(AmazonBuyerInfo {
                buyer_name: Some(buyer.to_string()),
            }),
        })
        .filter(|o| in_window(o.purchase_date.as_deref(), window))
        .map(RawOrder::Amazon)
        .collect()
}

pub fn flipkart_orders(now: DateTime<Utc>, window: &DayWindow) -> Vec<RawOrder> {
    let rows = [
        ("OD123456789012345", 1, 2499, "SHIPPED", "COD", "Rajesh Kumar", "Maharashtra", None),
        ("OD123456789012346", 2, 1899, "DELIVERED", "PREPAID", "Priya Sharma", "Karnataka", Some(0)),
        ("OD123456789012347", 3, 3299, "APPROVED", "COD", "Amit Patel", "Delhi", None),
        ("OD123456789012348", 4, 1599, "SHIPPED", "PREPAID", "Sneha Reddy", "Telangana", None),
        ("OD123456789012349", 5, 4999, "DELIVERED", "COD", "Vikram Singh", "Punjab", Some(1)),
    ];

    rows.into_iter()
        .map(
            |(id, age, price, status, payment, name, state, delivered_age)| FlipkartOrderItem {
                order_id: id.to_string(),
                order_item_id: None,
                order_date: Some(days_ago(now, age)),
                price_components: Some(FlipkartPriceComponents {
                    selling_price: Some(serde_json::Value::from(price)),
                    total_price: None,
                }),
                order_item_status: Some(status.to_string()),
                payment_type: Some(payment.to_string()),
                shipping_address: Some(FlipkartAddress {
                    name: Some(name.to_string()),
                    state: Some(state.to_string()),
                    city: None,
                }),
                delivery_date: delivered_age.map(|d| days_ago(now, d)),
            },
        )
        .filter(|o| in_window(o.order_date.as_deref(), window))
        .map(RawOrder::Flipkart)
        .collect()
}

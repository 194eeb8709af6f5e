pub mod amazon;
pub mod common;
pub mod flipkart;

use super::adapter::RawOrder;
use contracts::domain::a001_order::aggregate::NormalizedOrder;

/// Map any marketplace record into the canonical shape. Never fails.
pub fn normalize(raw: &RawOrder) -> NormalizedOrder {
    match raw {
        RawOrder::Amazon(order) => amazon::normalize_amazon_order(order),
        RawOrder::Flipkart(item) => flipkart::normalize_flipkart_item(item),
    }
}

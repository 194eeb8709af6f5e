use super::common::{
    customer_name, delivered_date_millis, order_date_millis, parse_amount, StatusTable,
};
use crate::usecases::u501_sync_orders::flipkart_api_client::FlipkartOrderItem;
use contracts::domain::a001_order::aggregate::{NormalizedOrder, OrderStatus, PaymentType};
use contracts::enums::marketplace_type::MarketplaceType;

pub const FLIPKART_STATUSES: StatusTable = StatusTable {
    entries: &[
        ("APPROVED", OrderStatus::Pending),
        ("PACKED", OrderStatus::Pending),
        ("READY_TO_DISPATCH", OrderStatus::Pending),
        ("SHIPPED", OrderStatus::Shipped),
        ("DELIVERED", OrderStatus::Delivered),
        ("CANCELLED", OrderStatus::Cancelled),
        ("RETURNED", OrderStatus::Rto),
    ],
    default: OrderStatus::Pending,
};

const RETURNED: &str = "RETURNED";
const REPLACEMENT: &str = "REPLACEMENT";

pub fn normalize_flipkart_item(item: &FlipkartOrderItem) -> NormalizedOrder {
    let raw_status = item.order_item_status.as_deref();
    let status = FLIPKART_STATUSES.map(raw_status);
    let date = order_date_millis(&item.order_id, item.order_date.as_deref());
    let price = item
        .price_components
        .as_ref()
        .and_then(|p| p.selling_price.as_ref().or(p.total_price.as_ref()));
    let address = item.shipping_address.as_ref();

    NormalizedOrder {
        order_id: item.order_id.clone(),
        account: MarketplaceType::Flipkart,
        date,
        customer_name: customer_name(address.and_then(|a| a.name.as_deref())),
        amount: parse_amount(price),
        payment_type: PaymentType::parse(item.payment_type.as_deref().unwrap_or_default()),
        status,
        state: address.and_then(|a| a.state.clone()).unwrap_or_default(),
        rto: raw_status == Some(RETURNED),
        replacement: raw_status == Some(REPLACEMENT),
        delivered_date: delivered_date_millis(status, item.delivery_date.as_deref(), date),
    }
}

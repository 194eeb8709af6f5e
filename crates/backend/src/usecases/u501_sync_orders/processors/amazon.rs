use super::common::{
    customer_name, delivered_date_millis, order_date_millis, parse_amount, StatusTable,
};
use crate::usecases::u501_sync_orders::amazon_api_client::AmazonOrder;
use contracts::domain::a001_order::aggregate::{NormalizedOrder, OrderStatus, PaymentType};
use contracts::enums::marketplace_type::MarketplaceType;

pub const AMAZON_STATUSES: StatusTable = StatusTable {
    entries: &[
        ("Pending", OrderStatus::Pending),
        ("Unshipped", OrderStatus::Pending),
        ("PartiallyShipped", OrderStatus::Shipped),
        ("Shipped", OrderStatus::Shipped),
        ("Delivered", OrderStatus::Delivered),
        ("Canceled", OrderStatus::Cancelled),
        ("Unfulfillable", OrderStatus::Cancelled),
    ],
    default: OrderStatus::Pending,
};

const RETURNED: &str = "Returned";

pub fn normalize_amazon_order(order: &AmazonOrder) -> NormalizedOrder {
    let raw_status = order.order_status.as_deref();
    let status = AMAZON_STATUSES.map(raw_status);
    let date = order_date_millis(&order.amazon_order_id, order.purchase_date.as_deref());

    NormalizedOrder {
        order_id: order.amazon_order_id.clone(),
        account: MarketplaceType::Amazon,
        date,
        customer_name: customer_name(
            order
                .buyer_info
                .as_ref()
                .and_then(|b| b.buyer_name.as_deref()),
        ),
        amount: parse_amount(order.order_total.as_ref().and_then(|t| t.amount.as_ref())),
        payment_type: PaymentType::parse(order.payment_method.as_deref().unwrap_or_default()),
        status,
        state: order
            .shipping_address
            .as_ref()
            .and_then(|a| a.state_or_region.clone())
            .unwrap_or_default(),
        rto: raw_status == Some(RETURNED),
        replacement: false,
        delivered_date: delivered_date_millis(status, order.last_update_date.as_deref(), date),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::u501_sync_orders::amazon_api_client::{AmazonAddress, AmazonMoney};
    use serde_json::json;

    fn order(status: &str) -> AmazonOrder {
        AmazonOrder {
            amazon_order_id: "171-0000000-0000001".into(),
            purchase_date: Some("2024-01-10T08:00:00Z".into()),
            last_update_date: Some("2024-01-14T08:00:00Z".into()),
            order_status: Some(status.into()),
            order_total: Some(AmazonMoney {
                currency_code: Some("INR".into()),
                amount: Some(json!("2499.00")),
            }),
            payment_method: Some("Other".into()),
            shipping_address: Some(AmazonAddress {
                state_or_region: Some("Karnataka".into()),
                city: None,
            }),
            buyer_info: None,
        }
    }

    #[test]
    fn test_returned_maps_to_pending_with_rto_flag() {
        let n = normalize_amazon_order(&order("Returned"));
        assert_eq!(n.status, OrderStatus::Pending);
        assert!(n.rto);
        assert!(!n.replacement);
        assert_eq!(n.delivered_date, None);
    }

    #[test]
    fn test_status_table() {
        let cases = [
            ("Pending", OrderStatus::Pending),
            ("Unshipped", OrderStatus::Pending),
            ("PartiallyShipped", OrderStatus::Shipped),
            ("Shipped", OrderStatus::Shipped),
            ("Delivered", OrderStatus::Delivered),
            ("Canceled", OrderStatus::Cancelled),
            ("Unfulfillable", OrderStatus::Cancelled),
            ("InvoiceUnconfirmed", OrderStatus::Pending),
            ("", OrderStatus::Pending),
            ("shipped", OrderStatus::Pending),
        ];
        for (raw, expected) in cases {
            assert_eq!(AMAZON_STATUSES.map(Some(raw)), expected, "raw status {raw:?}");
        }
        assert_eq!(AMAZON_STATUSES.map(None), OrderStatus::Pending);
    }

    #[test]
    fn test_field_mapping() {
        let n = normalize_amazon_order(&order("Delivered"));
        assert_eq!(n.account, MarketplaceType::Amazon);
        assert_eq!(n.customer_name, "N/A");
        assert_eq!(n.amount, 2499.0);
        assert_eq!(n.payment_type, PaymentType::Prepaid);
        assert_eq!(n.state, "Karnataka");
        assert_eq!(n.date, 1_704_873_600_000);
        assert_eq!(n.delivered_date, Some(1_705_219_200_000));
    }

    #[test]
    fn test_cod_and_missing_fields() {
        let mut o = order("Shipped");
        o.payment_method = Some("COD".into());
        o.order_total = None;
        o.shipping_address = None;
        let n = normalize_amazon_order(&o);
        assert_eq!(n.payment_type, PaymentType::Cod);
        assert_eq!(n.amount, 0.0);
        assert_eq!(n.state, "");
    }
}

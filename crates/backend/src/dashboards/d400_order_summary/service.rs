use crate::domain::a001_order::OrderStore;
use crate::shared::dates::{local_day_of, local_day_start_millis, DayWindow};
use anyhow::Result;
use chrono::{Duration, FixedOffset, NaiveDate};
use contracts::dashboards::d400_order_summary::{
    DailySales, DashboardStats, OrderSummary, SalesByPayment,
};
use contracts::domain::a001_order::aggregate::{Order, OrderStatus, PaymentType};
use std::collections::HashMap;

pub const DASHBOARD_DAYS: u32 = 7;

/// Single pass over the orders. `total_sales` is the sum of both payment
/// buckets, so the split always adds up to the total.
pub fn summarize<'a>(orders: impl IntoIterator<Item = &'a Order>) -> OrderSummary {
    let mut summary = OrderSummary::default();
    let mut by_payment = SalesByPayment::default();

    for order in orders {
        summary.total_orders += 1;
        match order.status {
            OrderStatus::Shipped => summary.shipped_count += 1,
            OrderStatus::Delivered => summary.delivered_count += 1,
            _ => {}
        }
        if order.rto {
            summary.rto_count += 1;
        }
        if order.replacement {
            summary.replacement_count += 1;
        }
        match order.payment_type {
            PaymentType::Cod => {
                summary.cod_count += 1;
                by_payment.cod += order.amount;
            }
            PaymentType::Prepaid => {
                summary.prepaid_count += 1;
                by_payment.prepaid += order.amount;
            }
        }
    }

    summary.total_sales = by_payment.total();
    summary.sales_by_payment = by_payment;
    summary
}

pub fn orders_in_window<'a>(
    orders: &'a [Order],
    window: &'a DayWindow,
) -> impl Iterator<Item = &'a Order> + 'a {
    orders.iter().filter(move |o| window.contains(o.date))
}

pub fn summarize_window(orders: &[Order], window: &DayWindow) -> OrderSummary {
    summarize(orders_in_window(orders, window))
}

/// One point per local day, oldest first, ending with `last_day`
pub fn daily_sales(
    orders: &[Order],
    last_day: NaiveDate,
    days: u32,
    offset: FixedOffset,
) -> Vec<DailySales> {
    let mut buckets: HashMap<NaiveDate, (f64, usize)> = HashMap::new();
    for order in orders {
        let bucket = buckets
            .entry(local_day_of(order.date, offset))
            .or_insert((0.0, 0));
        bucket.0 += order.amount;
        bucket.1 += 1;
    }

    (0..i64::from(days))
        .rev()
        .map(|back| {
            let day = last_day - Duration::days(back);
            let (sales, orders) = buckets.get(&day).copied().unwrap_or((0.0, 0));
            DailySales {
                date: day.format("%Y-%m-%d").to_string(),
                label: day.format("%b %d").to_string(),
                sales,
                orders,
            }
        })
        .collect()
}

/// Cards and chart for the dashboard; `today` is the local calendar day
pub fn dashboard_stats(orders: &[Order], today: NaiveDate, offset: FixedOffset) -> DashboardStats {
    let today_start = local_day_start_millis(today, offset);
    let (today_orders, today_amount) = orders
        .iter()
        .filter(|o| o.date >= today_start)
        .fold((0, 0.0), |(count, amount), o| (count + 1, amount + o.amount));

    DashboardStats {
        today_orders,
        today_amount,
        overall: summarize(orders),
        last_7_days: daily_sales(orders, today, DASHBOARD_DAYS, offset),
    }
}

/// Summary of the user's orders placed inside `window`
pub async fn get_summary(
    store: &dyn OrderStore,
    user_id: &str,
    window: &DayWindow,
) -> Result<OrderSummary> {
    let orders = store.query(user_id).await?;
    Ok(summarize_window(&orders, window))
}

pub async fn get_dashboard(
    store: &dyn OrderStore,
    user_id: &str,
    today: NaiveDate,
    offset: FixedOffset,
) -> Result<DashboardStats> {
    let orders = store.query(user_id).await?;
    Ok(dashboard_stats(&orders, today, offset))
}

/// Orders of the user inside `window`, in store order
pub async fn get_orders_in_window(
    store: &dyn OrderStore,
    user_id: &str,
    window: &DayWindow,
) -> Result<Vec<Order>> {
    let orders = store.query(user_id).await?;
    Ok(orders.into_iter().filter(|o| window.contains(o.date)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a001_order::store::memory::MemoryOrderStore;
    use chrono::TimeZone;
    use contracts::enums::marketplace_type::MarketplaceType;

    fn ist() -> FixedOffset {
        FixedOffset::east_opt(330 * 60).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> i64 {
        ist().with_ymd_and_hms(y, m, d, h, min, s).unwrap().timestamp_millis()
    }

    fn order(id: &str, date: i64, amount: f64, payment: PaymentType, status: OrderStatus) -> Order {
        Order {
            id: None,
            user_id: "user-1".into(),
            order_id: id.into(),
            account: MarketplaceType::Flipkart,
            date,
            customer_name: "Buyer".into(),
            amount,
            payment_type: payment,
            status,
            state: "Kerala".into(),
            rto: false,
            replacement: false,
            delivered_date: None,
            synced_from_amazon: false,
            synced_from_flipkart: true,
            last_sync_date: date,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_summary_counts_and_payment_split() {
        let mut rto = order("3", at(2024, 1, 12, 9, 0, 0), 0.1, PaymentType::Cod, OrderStatus::Pending);
        rto.rto = true;
        let mut replaced = order("4", at(2024, 1, 13, 9, 0, 0), 0.2, PaymentType::Prepaid, OrderStatus::Shipped);
        replaced.replacement = true;
        let orders = vec![
            order("1", at(2024, 1, 10, 9, 0, 0), 1599.0, PaymentType::Prepaid, OrderStatus::Shipped),
            order("2", at(2024, 1, 11, 9, 0, 0), 2499.5, PaymentType::Cod, OrderStatus::Delivered),
            rto,
            replaced,
        ];

        let s = summarize(&orders);
        assert_eq!(s.total_orders, 4);
        assert_eq!(s.shipped_count, 2);
        assert_eq!(s.delivered_count, 1);
        assert_eq!(s.rto_count, 1);
        assert_eq!(s.replacement_count, 1);
        assert_eq!(s.cod_count, 2);
        assert_eq!(s.prepaid_count, 2);
        assert_eq!(s.sales_by_payment.cod + s.sales_by_payment.prepaid, s.total_sales);
    }

    #[test]
    fn test_empty_summary_is_zero() {
        let s = summarize(&Vec::<Order>::new());
        assert_eq!(s, OrderSummary::default());
        assert_eq!(s.total_sales, 0.0);
    }

    #[test]
    fn test_end_date_is_fully_included() {
        let orders = vec![
            order("first", at(2024, 1, 1, 0, 0, 0), 10.0, PaymentType::Cod, OrderStatus::Pending),
            order("last", at(2024, 1, 31, 23, 59, 59), 20.0, PaymentType::Cod, OrderStatus::Pending),
            order("after", at(2024, 2, 1, 0, 0, 0), 40.0, PaymentType::Cod, OrderStatus::Pending),
            order("before", at(2023, 12, 31, 23, 59, 59), 80.0, PaymentType::Cod, OrderStatus::Pending),
        ];
        let window = DayWindow::parse("2024-01-01", "2024-01-31", ist()).unwrap();

        let s = summarize_window(&orders, &window);
        assert_eq!(s.total_orders, 2);
        assert_eq!(s.total_sales, 30.0);
    }

    #[test]
    fn test_daily_sales_buckets_by_local_day() {
        let orders = vec![
            // 00:10 IST on the 7th is still the 6th in UTC
            order("a", at(2024, 1, 7, 0, 10, 0), 100.0, PaymentType::Cod, OrderStatus::Pending),
            order("b", at(2024, 1, 7, 23, 50, 0), 50.0, PaymentType::Prepaid, OrderStatus::Pending),
            order("c", at(2024, 1, 1, 12, 0, 0), 5.0, PaymentType::Prepaid, OrderStatus::Pending),
            order("old", at(2023, 12, 31, 12, 0, 0), 999.0, PaymentType::Prepaid, OrderStatus::Pending),
        ];

        let series = daily_sales(&orders, day(2024, 1, 7), 7, ist());
        assert_eq!(series.len(), 7);
        assert_eq!(series[0].date, "2024-01-01");
        assert_eq!(series[0].label, "Jan 01");
        assert_eq!(series[0].sales, 5.0);
        assert_eq!(series[3].orders, 0);
        assert_eq!(series[6].date, "2024-01-07");
        assert_eq!(series[6].sales, 150.0);
        assert_eq!(series[6].orders, 2);
    }

    #[test]
    fn test_dashboard_today_starts_at_local_midnight() {
        let orders = vec![
            order("today", at(2024, 1, 7, 0, 0, 0), 100.0, PaymentType::Cod, OrderStatus::Delivered),
            order("yesterday", at(2024, 1, 6, 23, 59, 59), 50.0, PaymentType::Cod, OrderStatus::Shipped),
        ];

        let stats = dashboard_stats(&orders, day(2024, 1, 7), ist());
        assert_eq!(stats.today_orders, 1);
        assert_eq!(stats.today_amount, 100.0);
        assert_eq!(stats.overall.total_orders, 2);
        assert_eq!(stats.overall.delivered_count, 1);
        assert_eq!(stats.overall.shipped_count, 1);
        assert_eq!(stats.last_7_days.len(), 7);
        assert_eq!(stats.last_7_days[5].sales, 50.0);
    }

    #[tokio::test]
    async fn test_summary_is_scoped_to_user() {
        let store = MemoryOrderStore::new();
        let mine = order("1", at(2024, 1, 10, 9, 0, 0), 10.0, PaymentType::Cod, OrderStatus::Pending);
        let mut theirs = mine.clone();
        theirs.user_id = "user-2".into();
        store.insert(&mine).await.unwrap();
        store.insert(&theirs).await.unwrap();

        let window = DayWindow::parse("2024-01-01", "2024-01-31", ist()).unwrap();
        let s = get_summary(&store, "user-1", &window).await.unwrap();
        assert_eq!(s.total_orders, 1);
        let rows = get_orders_in_window(&store, "user-2", &window).await.unwrap();
        assert_eq!(rows.len(), 1);
    }
}

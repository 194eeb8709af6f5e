use crate::shared::dates::format_local;
use anyhow::Result;
use chrono::FixedOffset;
use contracts::domain::a001_order::aggregate::Order;

pub const CSV_HEADERS: [&str; 9] = [
    "Date",
    "Order ID",
    "Customer",
    "State",
    "Amount",
    "Payment",
    "Status",
    "RTO",
    "Replacement",
];

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

/// Render orders as a CSV report; dates are local "dd/MM/yyyy"
pub fn orders_to_csv<'a>(
    orders: impl IntoIterator<Item = &'a Order>,
    offset: FixedOffset,
) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADERS)?;

    for order in orders {
        writer.write_record([
            format_local(order.date, offset, "%d/%m/%Y"),
            order.order_id.clone(),
            order.customer_name.clone(),
            order.state.clone(),
            order.amount.to_string(),
            order.payment_type.to_string(),
            order.status.to_string(),
            yes_no(order.rto).to_string(),
            yes_no(order.replacement).to_string(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| anyhow::anyhow!("{}", e))?;
    Ok(String::from_utf8(bytes)?)
}

pub fn report_file_name(date_from: &str, date_to: &str) -> String {
    format!("orders_{}_to_{}.csv", date_from, date_to)
}

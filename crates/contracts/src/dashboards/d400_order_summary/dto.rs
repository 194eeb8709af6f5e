use serde::{Deserialize, Serialize};

/// Report window. Dates are "YYYY-MM-DD"; `date_to` is fully included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRequest {
    pub date_from: String,
    pub date_to: String,
}

/// Sales totals grouped by payment type
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesByPayment {
    pub cod: f64,
    pub prepaid: f64,
}

impl SalesByPayment {
    pub fn total(&self) -> f64 {
        self.cod + self.prepaid
    }
}

/// Aggregates over the orders of a date window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub total_orders: usize,
    pub total_sales: f64,
    pub shipped_count: usize,
    pub delivered_count: usize,
    /// Orders flagged `rto`, regardless of status
    pub rto_count: usize,
    /// Orders flagged `replacement`, regardless of status
    pub replacement_count: usize,
    pub cod_count: usize,
    pub prepaid_count: usize,
    pub sales_by_payment: SalesByPayment,
}

/// One calendar day of the sales series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySales {
    /// "YYYY-MM-DD"
    pub date: String,
    /// Chart label, e.g. "Jan 05"
    pub label: String,
    pub sales: f64,
    pub orders: usize,
}

/// Dashboard cards and chart over all of a user's orders
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub today_orders: usize,
    pub today_amount: f64,
    /// Status, flag and payment counts over all orders
    pub overall: OrderSummary,
    pub last_7_days: Vec<DailySales>,
}

pub mod dto;

pub use dto::{DailySales, DashboardStats, OrderSummary, SalesByPayment, SummaryRequest};

use axum::{
    extract::Query,
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use contracts::dashboards::d400_order_summary::{DashboardStats, OrderSummary, SummaryRequest};
use contracts::usecases::common::UseCaseError;

use super::{api_error, internal_error, order_store, ApiError};
use crate::dashboards::d400_order_summary::{export, service};
use crate::shared::config::get_config;
use crate::shared::dates::DayWindow;
use crate::system::auth::extractor::CurrentUser;

fn window(request: &SummaryRequest) -> Result<DayWindow, ApiError> {
    DayWindow::parse(
        &request.date_from,
        &request.date_to,
        get_config().reporting.offset(),
    )
    .map_err(|e| api_error(UseCaseError::validation(e)))
}

/// GET /api/d400/summary?date_from=2024-01-01&date_to=2024-01-31
pub async fn get_summary(
    user: CurrentUser,
    Query(request): Query<SummaryRequest>,
) -> Result<Json<OrderSummary>, ApiError> {
    let window = window(&request)?;
    let summary = service::get_summary(order_store().as_ref(), user.user_id(), &window)
        .await
        .map_err(|e| internal_error("Failed to compute order summary", e))?;

    tracing::info!(
        "D400: {} orders, {:.2} sales for {} .. {}",
        summary.total_orders,
        summary.total_sales,
        request.date_from,
        request.date_to
    );
    Ok(Json(summary))
}

/// GET /api/d400/dashboard
pub async fn get_dashboard(user: CurrentUser) -> Result<Json<DashboardStats>, ApiError> {
    let offset = get_config().reporting.offset();
    let today = Utc::now().with_timezone(&offset).date_naive();

    let stats = service::get_dashboard(order_store().as_ref(), user.user_id(), today, offset)
        .await
        .map_err(|e| internal_error("Failed to compute dashboard", e))?;

    Ok(Json(stats))
}

/// GET /api/d400/export?date_from=2024-01-01&date_to=2024-01-31
pub async fn export_csv(
    user: CurrentUser,
    Query(request): Query<SummaryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let window = window(&request)?;
    let orders = service::get_orders_in_window(order_store().as_ref(), user.user_id(), &window)
        .await
        .map_err(|e| internal_error("Failed to load orders for export", e))?;

    let body = export::orders_to_csv(&orders, get_config().reporting.offset())
        .map_err(|e| internal_error("Failed to render CSV report", e))?;
    let file_name = export::report_file_name(&request.date_from, &request.date_to);

    tracing::info!("D400: exporting {} orders as {}", orders.len(), file_name);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        body,
    ))
}

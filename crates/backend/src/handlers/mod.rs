pub mod a001_order;
pub mod d400_order_summary;
pub mod u501_sync_orders;

use crate::domain::a001_order::{repository::OrderRepository, OrderStore};
use axum::{http::StatusCode, Json};
use contracts::usecases::common::UseCaseError;
use once_cell::sync::Lazy;
use std::sync::Arc;

static ORDER_STORE: Lazy<Arc<dyn OrderStore>> = Lazy::new(|| Arc::new(OrderRepository));

pub fn order_store() -> Arc<dyn OrderStore> {
    Arc::clone(&ORDER_STORE)
}

/// Error response: `{code, message}` with a matching status
pub type ApiError = (StatusCode, Json<UseCaseError>);

pub fn status_for(err: &UseCaseError) -> StatusCode {
    match err.code.as_str() {
        "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
        "AUTH_ERROR" => StatusCode::UNAUTHORIZED,
        "FETCH_ERROR" => StatusCode::BAD_GATEWAY,
        "NOT_FOUND" => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn api_error(err: impl Into<UseCaseError>) -> ApiError {
    let err = err.into();
    (status_for(&err), Json(err))
}

/// Log an infrastructure failure and hide it behind a 500
pub fn internal_error(context: &str, err: anyhow::Error) -> ApiError {
    tracing::error!("{}: {:#}", context, err);
    api_error(UseCaseError::internal(context.to_string()))
}

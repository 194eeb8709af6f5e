use axum::{
    extract::{Path, Query},
    Json,
};
use chrono::Utc;
use contracts::domain::a001_order::aggregate::{Order, OrderId, OrderStatus, PaymentType};
use contracts::domain::common::AggregateId;
use contracts::usecases::common::UseCaseError;
use serde::Deserialize;

use super::{api_error, internal_error, order_store, ApiError};
use crate::domain::a001_order::service::{self, OrderFilter};
use crate::system::auth::extractor::CurrentUser;

#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub payment: Option<String>,
}

impl OrdersQuery {
    /// Empty values and "All" mean no filter
    pub fn into_filter(self) -> Result<OrderFilter, UseCaseError> {
        fn selected(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty() && v != "All")
        }

        let status = match selected(self.status) {
            Some(s) => Some(
                OrderStatus::parse(&s)
                    .ok_or_else(|| UseCaseError::validation(format!("Unknown status '{}'", s)))?,
            ),
            None => None,
        };
        let payment_type = match selected(self.payment) {
            Some(p) if p == "COD" || p == "Prepaid" => Some(PaymentType::parse(&p)),
            Some(p) => {
                return Err(UseCaseError::validation(format!(
                    "Unknown payment type '{}'",
                    p
                )))
            }
            None => None,
        };

        Ok(OrderFilter {
            search: self.search,
            status,
            payment_type,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// GET /api/a001/orders?search=&status=&payment=
pub async fn list_orders(
    user: CurrentUser,
    Query(query): Query<OrdersQuery>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let filter = query.into_filter().map_err(api_error)?;
    let orders = service::list_for_user(order_store().as_ref(), user.user_id(), &filter)
        .await
        .map_err(|e| internal_error("Failed to list orders", e))?;

    Ok(Json(orders))
}

/// PUT /api/a001/orders/:id/status
pub async fn update_status(
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, ApiError> {
    let id = OrderId::from_string(&id)
        .map_err(|e| api_error(UseCaseError::validation(format!("Invalid order id: {}", e))))?;

    let now = Utc::now().timestamp_millis();
    service::update_status(order_store().as_ref(), user.user_id(), id, request.status, now)
        .await
        .map_err(|e| internal_error("Failed to update order status", e))?
        .map(Json)
        .ok_or_else(|| api_error(UseCaseError::not_found("Order not found")))
}

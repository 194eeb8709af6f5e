use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, system};

/// All application routes. Everything under `/api` requires a bearer token.
pub fn configure_routes() -> Router {
    let api = Router::new()
        // U501 Sync orders
        .route(
            "/api/u501/sync/amazon",
            post(handlers::u501_sync_orders::amazon_sync),
        )
        .route(
            "/api/u501/sync/flipkart",
            post(handlers::u501_sync_orders::flipkart_sync),
        )
        // A001 Orders
        .route("/api/a001/orders", get(handlers::a001_order::list_orders))
        .route(
            "/api/a001/orders/:id/status",
            put(handlers::a001_order::update_status),
        )
        // D400 Order summary
        .route(
            "/api/d400/summary",
            get(handlers::d400_order_summary::get_summary),
        )
        .route(
            "/api/d400/dashboard",
            get(handlers::d400_order_summary::get_dashboard),
        )
        .route(
            "/api/d400/export",
            get(handlers::d400_order_summary::export_csv),
        )
        .route_layer(middleware::from_fn(system::auth::middleware::require_auth));

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(api)
}

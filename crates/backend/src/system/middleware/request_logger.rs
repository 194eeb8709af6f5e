use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

/// Logs status, method, path and duration of every request.
/// Query strings and bodies are not logged.
pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let start = std::time::Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    let status = response.status();
    let duration = start.elapsed().as_millis();
    if status.is_server_error() {
        tracing::error!("{} {} {} {}ms", status.as_u16(), method, path, duration);
    } else if status.is_client_error() {
        tracing::warn!("{} {} {} {}ms", status.as_u16(), method, path, duration);
    } else {
        tracing::info!("{} {} {} {}ms", status.as_u16(), method, path, duration);
    }

    response
}

pub mod about_us;
pub mod applications;
pub mod health;

use std::any::Any;

use axum::{
    extract::{DefaultBodyLimit, OriginalUri},
    http::{
        header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, CONTENT_TYPE},
        HeaderValue, Method,
    },
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::de::DeserializeOwned;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    set_header::SetResponseHeaderLayer,
};

use crate::errors::AppError;
use crate::state::AppState;

const ALLOWED_METHODS: &str = "GET, POST, OPTIONS";

/// Parses a request body as JSON. Any failure (empty body, bad syntax, wrong shape) is a 400.
pub fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("Invalid JSON body: {e}")))
}

/// Fallback for anything no route matched, including unsupported methods on known paths.
async fn route_not_found(method: Method, OriginalUri(uri): OriginalUri) -> AppError {
    AppError::route_not_found(method, uri.path())
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    AppError::Internal(anyhow::anyhow!("handler panicked: {detail}")).into_response()
}

/// The operations table, mounted both at the root and under `/api`.
fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/applications",
            get(applications::handle_list)
                .post(applications::handle_create)
                .fallback(route_not_found),
        )
        .route(
            "/applications/:id",
            get(applications::handle_get).fallback(route_not_found),
        )
        .route(
            "/applications/:id/resume",
            get(applications::handle_get_resume).fallback(route_not_found),
        )
        .route(
            "/about-us",
            get(about_us::handle_get)
                .post(about_us::handle_update)
                .fallback(route_not_found),
        )
}

/// `CorsLayer` answers every OPTIONS request itself with an empty 200, whatever the path.
/// The two header layers repeat the allowed headers and methods on ordinary responses.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_headers([CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS]);

    Router::new()
        .route("/health", get(health::health_handler))
        .merge(api_routes())
        .nest("/api", api_routes())
        .fallback(route_not_found)
        .layer(DefaultBodyLimit::max(state.config.max_body_bytes))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(SetResponseHeaderLayer::if_not_present(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("content-type"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        ))
        .layer(cors)
        .with_state(state)
}

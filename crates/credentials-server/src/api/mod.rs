//! HTTP transport for the RPC boundary

mod security_headers;

pub use security_headers::security_headers_middleware;

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use tower_http::trace::TraceLayer;

use crate::rpc::{RpcDispatcher, RpcError, RpcRequest};

/// Create the HTTP router
pub fn create_router(dispatcher: Arc<RpcDispatcher>) -> Router {
    Router::new()
        .route("/rpc", post(handle_rpc))
        .route("/health", get(health))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(dispatcher)
}

async fn handle_rpc(
    State(dispatcher): State<Arc<RpcDispatcher>>,
    request: Result<Json<RpcRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match request {
        Ok(request) => request,
        Err(_) => return RpcError::new("Malformed RPC request").into_response(),
    };

    match dispatcher.dispatch(&request.pattern, request.data).await {
        Ok(value) => (StatusCode::OK, Json(value)).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn health() -> &'static str {
    "OK"
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(self)).into_response()
    }
}

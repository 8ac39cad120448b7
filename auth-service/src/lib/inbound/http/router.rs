use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::admin::get_identity;
use super::handlers::current_identity::get_current_identity;
use super::handlers::current_identity::update_current_identity;
use super::handlers::ping::ping;
use super::handlers::signin::signin;
use super::handlers::signup::signup;
use super::middleware::authenticate;
use super::middleware::AuthenticationPipeline;
use crate::domain::identity::ports::AuthenticationServicePort;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthenticationServicePort>,
    pub pipeline: Arc<AuthenticationPipeline>,
}

pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/v1/signup", post(signup))
        .route("/api/v1/signin", post(signin))
        .route("/api/v1/test/ping", get(ping));

    // Access is enforced per handler by the `Authenticated` and `RequireAdmin` extractors.
    let identity_routes = Router::new()
        .route(
            "/api/v1/users/me",
            get(get_current_identity).patch(update_current_identity),
        )
        .route("/api/v1/admin/identities/:email", get(get_identity));

    // Headers are left out of the span: they carry bearer tokens.
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(identity_routes)
        .layer(
            ServiceBuilder::new()
                .layer(trace_layer)
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn_with_state(state.clone(), authenticate)),
        )
        .with_state(state)
}

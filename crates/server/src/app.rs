use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use authbridge_auth::auth_routes;

use crate::{handlers::health::livez, state::AppState};

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    // Auth routes carry their own state; the cookies only work cross-origin
    // with credentials, so origins must be listed explicitly.
    let auth_router = auth_routes().with_state(state.auth.clone());

    let router = Router::new().route("/livez", get(livez));
    let router = match state.config.route_prefix.as_str() {
        "" => router.merge(auth_router),
        prefix => router.nest(prefix, auth_router),
    };

    router
        .layer(cors_layer(&state.config.cors_allowed_origins))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            state.config.request_timeout(),
        ))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

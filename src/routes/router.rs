use crate::controllers::user::authenticate;
use crate::core::state::AppState;
use crate::routes::{posts, user};
use axum::{
    Router,
    extract::{DefaultBodyLimit, MatchedPath, Request},
    http::{HeaderName, Method, header},
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{self, CorsLayer},
    trace::TraceLayer,
};
use tracing::info_span;

const X_CSRF_TOKEN: HeaderName = HeaderName::from_static("x-csrf-token");

pub(crate) fn routes(state: AppState, max_upload_bytes: usize) -> Router {
    let authorized_routes = Router::new()
        .route("/post", post(posts::post))
        .route("/search", get(posts::search))
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    Router::new()
        .route("/signup", post(user::signup))
        .route("/login", post(user::login))
        .merge(authorized_routes)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                        let matched_path = request
                            .extensions()
                            .get::<MatchedPath>()
                            .map(MatchedPath::as_str);

                        info_span!(
                            "request",
                            method = ?request.method(),
                            matched_path,
                        )
                    }),
                )
                .layer(cors_layer())
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
}

/// Answers every `OPTIONS` request itself, before routing or authentication.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::CONTENT_LENGTH,
            header::ACCEPT_ENCODING,
            X_CSRF_TOKEN,
            header::AUTHORIZATION,
        ])
}

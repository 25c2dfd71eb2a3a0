mod handlers;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::service::DocumentService;

pub fn create_router(service: DocumentService) -> Router {
    let config = service.config();
    let body_limit = DefaultBodyLimit::max(config.max_upload_bytes);
    let cors = cors_layer(config.cors_origins.as_deref());

    let api = Router::new()
        // Documents
        .route("/upload", post(handlers::upload_document))
        .route("/summary/{id}", get(handlers::get_summary))
        .route("/document/{id}", get(handlers::get_document))
        // Questions
        .route("/ask", post(handlers::ask_question))
        .route("/evaluate", post(handlers::grade_answer))
        // Challenge
        .route("/challenge/{id}", get(handlers::get_challenge))
        .route("/challenge/submit", post(handlers::submit_challenge_answers))
        .route("/challenge/evaluate", post(handlers::evaluate_challenge))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(body_limit),
        )
        .with_state(service)
}

/// Permissive unless specific origins are configured.
fn cors_layer(origins: Option<&[String]>) -> CorsLayer {
    let Some(origins) = origins else {
        return CorsLayer::permissive();
    };

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

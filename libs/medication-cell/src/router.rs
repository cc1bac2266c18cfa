use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

/// Medication management. Open to any authenticated role: doctors prescribe,
/// patients review their prescriptions.
pub fn medication_routes(state: Arc<AppConfig>) -> Router {
    let protected_routes = Router::new()
        .route(
            "/appointments/{appointment_id}",
            post(handlers::add_medication),
        )
        .route(
            "/appointments/{appointment_id}",
            get(handlers::list_medications),
        )
        .route("/{medication_id}", get(handlers::get_medication))
        .route("/{medication_id}", put(handlers::update_medication))
        .route("/{medication_id}", delete(handlers::remove_medication))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new().merge(protected_routes).with_state(state)
}

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_models::auth::Role;
use shared_utils::extractor::{auth_middleware, require_role};

use crate::handlers;

/// Appointment browsing, booking, and cancellation. The whole group is
/// patient-facing; doctors reach their schedule through the doctor routes.
pub fn appointment_routes(state: Arc<AppConfig>) -> Router {
    let protected_routes = Router::new()
        .route("/available-doctors", get(handlers::available_doctors))
        .route("/available", get(handlers::available_appointments))
        .route("/book", post(handlers::book_appointment))
        .route("/cancel", post(handlers::cancel_appointment))
        .route("/view", get(handlers::view_appointments))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .layer(middleware::from_fn(|req, next| {
            require_role(Role::Patient, req, next)
        }))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new().merge(protected_routes).with_state(state)
}

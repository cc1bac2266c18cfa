use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_models::auth::Role;
use shared_utils::extractor::{auth_middleware, require_role};

use crate::handlers;

/// Doctor-facing routes. Registration is public; everything else requires
/// the DOCTOR role.
pub fn doctor_routes(state: Arc<AppConfig>) -> Router {
    let public_routes = Router::new().route("/register", post(handlers::register_doctor));

    let protected_routes = Router::new()
        .route("/me", get(handlers::get_my_profile))
        .route("/patients", get(handlers::my_patients))
        .route("/appointments", get(handlers::my_appointments))
        .route(
            "/appointments/{appointment_id}/status",
            patch(handlers::update_appointment_status),
        )
        .route("/{doctor_id}", put(handlers::update_doctor))
        .layer(middleware::from_fn(|req, next| {
            require_role(Role::Doctor, req, next)
        }))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

/// Doctor administration, mounted under `/admin`.
pub fn admin_doctor_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/doctors", get(handlers::list_doctors))
        .route("/doctors/{doctor_id}", put(handlers::update_doctor))
        .route("/doctors/{doctor_id}", delete(handlers::delete_doctor))
        .layer(middleware::from_fn(|req, next| {
            require_role(Role::Admin, req, next)
        }))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

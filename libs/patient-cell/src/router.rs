use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_models::auth::Role;
use shared_utils::extractor::{auth_middleware, require_role};

use crate::handlers;

/// Patient-facing routes. Registration is public; everything else requires
/// the PATIENT role.
pub fn patient_routes(state: Arc<AppConfig>) -> Router {
    let public_routes = Router::new().route("/register", post(handlers::register_patient));

    let protected_routes = Router::new()
        .route("/me", get(handlers::get_my_profile))
        .route("/doctors", get(handlers::my_doctors))
        .route("/{patient_id}", put(handlers::update_patient))
        .layer(middleware::from_fn(|req, next| {
            require_role(Role::Patient, req, next)
        }))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

/// Patient administration, mounted under `/admin`.
pub fn admin_patient_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/patients", get(handlers::list_patients))
        .route("/patients/{patient_id}", put(handlers::update_patient))
        .route("/patients/{patient_id}", delete(handlers::delete_patient))
        .layer(middleware::from_fn(|req, next| {
            require_role(Role::Admin, req, next)
        }))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

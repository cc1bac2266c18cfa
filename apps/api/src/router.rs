use std::sync::Arc;

use axum::{routing::get, Router};

use appointment_cell::router::appointment_routes;
use auth_cell::router::auth_routes;
use doctor_cell::router::{admin_doctor_routes, doctor_routes};
use medication_cell::router::medication_routes;
use patient_cell::router::{admin_patient_routes, patient_routes};
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    let admin = Router::new()
        .merge(admin_doctor_routes(state.clone()))
        .merge(admin_patient_routes(state.clone()));

    Router::new()
        .route("/", get(|| async { "Clinic appointment API is running!" }))
        .nest("/auth", auth_routes(state.clone()))
        .nest("/doctors", doctor_routes(state.clone()))
        .nest("/patients", patient_routes(state.clone()))
        .nest("/appointments", appointment_routes(state.clone()))
        .nest("/medications", medication_routes(state.clone()))
        .nest("/admin", admin)
}

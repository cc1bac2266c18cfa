use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::{Role, User};
use shared_models::error::AppError;

use crate::models::{PatientError, RegisterPatientRequest, UpdatePatientRequest};
use crate::services::patient::PatientService;

/// A patient may only act on their own record; admins on any.
fn authorize_patient_scope(user: &User, patient_id: i64) -> Result<(), AppError> {
    match user.role {
        Role::Admin => Ok(()),
        Role::Patient => {
            let own: i64 = user
                .id
                .parse()
                .map_err(|_| AppError::BadRequest("Invalid user id in token".to_string()))?;
            if own == patient_id {
                Ok(())
            } else {
                Err(AppError::Forbidden(
                    "Not authorized to act for this patient".to_string(),
                ))
            }
        }
        Role::Doctor => Err(AppError::Forbidden(
            "Doctors cannot modify patient records".to_string(),
        )),
    }
}

fn map_patient_error(e: PatientError) -> AppError {
    match e {
        PatientError::NotFound => AppError::NotFound("Patient not found".to_string()),
        PatientError::ValidationError(msg) => AppError::ValidationError(msg),
        PatientError::DatabaseError(msg) => AppError::Database(msg),
        PatientError::Internal(msg) => AppError::Internal(msg),
    }
}

#[axum::debug_handler]
pub async fn register_patient(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<RegisterPatientRequest>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(&state);

    let patient = service
        .register_patient(request)
        .await
        .map_err(map_patient_error)?;

    Ok(Json(json!({
        "success": true,
        "patient": patient,
        "message": "Patient registered successfully"
    })))
}

#[axum::debug_handler]
pub async fn get_my_profile(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let patient_id: i64 = user
        .id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid user id in token".to_string()))?;

    let service = PatientService::new(&state);
    let patient = service
        .get_patient(patient_id)
        .await
        .map_err(map_patient_error)?;

    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn my_doctors(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let patient_id: i64 = user
        .id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid user id in token".to_string()))?;

    let service = PatientService::new(&state);
    let doctors = service
        .doctors_of(patient_id)
        .await
        .map_err(map_patient_error)?;

    Ok(Json(json!({
        "patient_id": patient_id,
        "doctors": doctors,
        "total": doctors.len()
    })))
}

#[axum::debug_handler]
pub async fn update_patient(
    State(state): State<Arc<AppConfig>>,
    Path(patient_id): Path<i64>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdatePatientRequest>,
) -> Result<Json<Value>, AppError> {
    authorize_patient_scope(&user, patient_id)?;

    let service = PatientService::new(&state);
    let patient = service
        .update_patient(patient_id, request)
        .await
        .map_err(map_patient_error)?;

    Ok(Json(json!({
        "success": true,
        "patient": patient,
        "message": "Patient updated successfully"
    })))
}

// ==============================================================================
// ADMIN HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_patients(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(&state);
    let patients = service.list_patients().await.map_err(map_patient_error)?;

    Ok(Json(json!({
        "patients": patients,
        "total": patients.len()
    })))
}

#[axum::debug_handler]
pub async fn delete_patient(
    State(state): State<Arc<AppConfig>>,
    Path(patient_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(&state);
    service
        .delete_patient(patient_id)
        .await
        .map_err(map_patient_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Patient deleted successfully"
    })))
}

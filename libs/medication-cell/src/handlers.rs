use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{CreateMedicationRequest, MedicationError, UpdateMedicationRequest};
use crate::services::medication::MedicationService;

fn map_medication_error(e: MedicationError) -> AppError {
    match e {
        MedicationError::NotFound => AppError::NotFound("Medication not found".to_string()),
        MedicationError::AppointmentNotFound => {
            AppError::NotFound("Appointment not found".to_string())
        }
        MedicationError::ValidationError(msg) => AppError::ValidationError(msg),
        MedicationError::DatabaseError(msg) => AppError::Database(msg),
    }
}

#[axum::debug_handler]
pub async fn add_medication(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<i64>,
    Json(request): Json<CreateMedicationRequest>,
) -> Result<Json<Value>, AppError> {
    let service = MedicationService::new(&state);

    let medication = service
        .add_to_appointment(appointment_id, request)
        .await
        .map_err(map_medication_error)?;

    Ok(Json(json!({
        "success": true,
        "medication": medication,
        "message": "Medication added successfully"
    })))
}

#[axum::debug_handler]
pub async fn list_medications(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let service = MedicationService::new(&state);

    let medications = service
        .medications_for_appointment(appointment_id)
        .await
        .map_err(map_medication_error)?;

    Ok(Json(json!({
        "appointment_id": appointment_id,
        "medications": medications,
        "total": medications.len()
    })))
}

#[axum::debug_handler]
pub async fn get_medication(
    State(state): State<Arc<AppConfig>>,
    Path(medication_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let service = MedicationService::new(&state);

    let medication = service
        .get_medication(medication_id)
        .await
        .map_err(map_medication_error)?;

    Ok(Json(json!(medication)))
}

#[axum::debug_handler]
pub async fn update_medication(
    State(state): State<Arc<AppConfig>>,
    Path(medication_id): Path<i64>,
    Json(request): Json<UpdateMedicationRequest>,
) -> Result<Json<Value>, AppError> {
    let service = MedicationService::new(&state);

    let medication = service
        .update_medication(medication_id, request)
        .await
        .map_err(map_medication_error)?;

    Ok(Json(json!({
        "success": true,
        "medication": medication,
        "message": "Medication updated successfully"
    })))
}

#[axum::debug_handler]
pub async fn remove_medication(
    State(state): State<Arc<AppConfig>>,
    Path(medication_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let service = MedicationService::new(&state);

    service
        .remove_medication(medication_id)
        .await
        .map_err(map_medication_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Medication removed successfully"
    })))
}

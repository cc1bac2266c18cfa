use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::{Role, User};
use shared_models::error::AppError;

use appointment_cell::models::{AppointmentError, UpdateStatusRequest};
use appointment_cell::services::booking::BookingService;
use appointment_cell::services::query::AppointmentQueryService;

use crate::models::{DoctorError, RegisterDoctorRequest, UpdateDoctorRequest};
use crate::services::doctor::DoctorService;

#[derive(Debug, Deserialize)]
pub struct ScheduleQuery {
    pub date: NaiveDate,
}

/// A doctor may only act on their own profile and schedule; admins on any.
fn authorize_doctor_scope(user: &User, doctor_id: i64) -> Result<(), AppError> {
    match user.role {
        Role::Admin => Ok(()),
        Role::Doctor => {
            let own: i64 = user
                .id
                .parse()
                .map_err(|_| AppError::BadRequest("Invalid user id in token".to_string()))?;
            if own == doctor_id {
                Ok(())
            } else {
                Err(AppError::Forbidden(
                    "Not authorized to act for this doctor".to_string(),
                ))
            }
        }
        Role::Patient => Err(AppError::Forbidden(
            "Patients cannot act on doctor records".to_string(),
        )),
    }
}

fn map_doctor_error(e: DoctorError) -> AppError {
    match e {
        DoctorError::NotFound => AppError::NotFound("Doctor not found".to_string()),
        DoctorError::ValidationError(msg) => AppError::ValidationError(msg),
        DoctorError::DatabaseError(msg) => AppError::Database(msg),
        DoctorError::Internal(msg) => AppError::Internal(msg),
    }
}

// ==============================================================================
// REGISTRATION AND PROFILE HANDLERS
// ==============================================================================

/// Public registration; slot generation for the rest of the month happens as
/// part of the same flow.
#[axum::debug_handler]
pub async fn register_doctor(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<RegisterDoctorRequest>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(&state);

    let doctor = service
        .register_doctor(request)
        .await
        .map_err(map_doctor_error)?;

    Ok(Json(json!({
        "success": true,
        "doctor": doctor,
        "message": "Doctor registered successfully"
    })))
}

#[axum::debug_handler]
pub async fn get_my_profile(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let doctor_id: i64 = user
        .id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid user id in token".to_string()))?;

    let service = DoctorService::new(&state);
    let doctor = service.get_doctor(doctor_id).await.map_err(map_doctor_error)?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn update_doctor(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<i64>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateDoctorRequest>,
) -> Result<Json<Value>, AppError> {
    authorize_doctor_scope(&user, doctor_id)?;

    let service = DoctorService::new(&state);
    let doctor = service
        .update_doctor(doctor_id, request)
        .await
        .map_err(map_doctor_error)?;

    Ok(Json(json!({
        "success": true,
        "doctor": doctor,
        "message": "Doctor updated successfully"
    })))
}

// ==============================================================================
// SCHEDULE HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn my_patients(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let doctor_id: i64 = user
        .id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid user id in token".to_string()))?;

    let service = DoctorService::new(&state);
    let patients = service.patients_of(doctor_id).await.map_err(map_doctor_error)?;

    Ok(Json(json!({
        "doctor_id": doctor_id,
        "patients": patients,
        "total": patients.len()
    })))
}

#[axum::debug_handler]
pub async fn my_appointments(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Query(params): Query<ScheduleQuery>,
) -> Result<Json<Value>, AppError> {
    let doctor_id: i64 = user
        .id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid user id in token".to_string()))?;

    let queries = AppointmentQueryService::new(&state);
    let appointments = queries
        .for_doctor_on(doctor_id, params.date)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({
        "doctor_id": doctor_id,
        "date": params.date,
        "appointments": appointments,
        "total": appointments.len()
    })))
}

/// Mark a consultation completed or cancelled. The transition is validated
/// against the slot lifecycle; releasing a slot goes through cancellation.
#[axum::debug_handler]
pub async fn update_appointment_status(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<i64>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let queries = AppointmentQueryService::new(&state);
    let appointment = queries
        .get_appointment(appointment_id)
        .await
        .map_err(|e| match e {
            AppointmentError::NotFound => AppError::NotFound("Appointment not found".to_string()),
            _ => AppError::Internal(e.to_string()),
        })?;

    authorize_doctor_scope(&user, appointment.doctor_id)?;

    let booking_service = BookingService::new(&state);
    let updated = booking_service
        .update_status(appointment_id, request.status)
        .await
        .map_err(|e| match e {
            AppointmentError::NotFound => AppError::NotFound("Appointment not found".to_string()),
            AppointmentError::InvalidStatusTransition { from, to } => {
                AppError::Conflict(format!("Invalid status transition: {} -> {}", from, to))
            }
            AppointmentError::ValidationError(msg) => AppError::BadRequest(msg),
            _ => AppError::Internal(e.to_string()),
        })?;

    Ok(Json(json!({
        "success": true,
        "appointment": updated,
        "message": "Appointment status updated"
    })))
}

// ==============================================================================
// ADMIN HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(&state);
    let doctors = service.list_doctors().await.map_err(map_doctor_error)?;

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len()
    })))
}

#[axum::debug_handler]
pub async fn delete_doctor(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(&state);
    service.delete_doctor(doctor_id).await.map_err(map_doctor_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Doctor deleted successfully"
    })))
}

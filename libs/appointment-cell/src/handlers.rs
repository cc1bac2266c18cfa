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

use crate::models::{
    AppointmentError, AppointmentStatus, BookAppointmentRequest, CancelAppointmentRequest,
};
use crate::services::booking::BookingService;
use crate::services::query::AppointmentQueryService;

// ==============================================================================
// QUERY PARAMETER STRUCTS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct AvailableDoctorsQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct AvailableAppointmentsQuery {
    pub doctor_id: i64,
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct ViewAppointmentsQuery {
    pub patient_id: i64,
    pub status: Option<AppointmentStatus>,
}

// ==============================================================================
// AUTHORIZATION HELPERS
// ==============================================================================

/// A patient may only act on their own rows; admins may act for anyone.
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
            "Doctors cannot act on patient bookings".to_string(),
        )),
    }
}

// ==============================================================================
// BROWSE HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn available_doctors(
    State(state): State<Arc<AppConfig>>,
    Query(params): Query<AvailableDoctorsQuery>,
) -> Result<Json<Value>, AppError> {
    let queries = AppointmentQueryService::new(&state);

    let doctors = queries
        .available_doctors_on(params.date)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({
        "date": params.date,
        "doctors": doctors,
        "total": doctors.len()
    })))
}

#[axum::debug_handler]
pub async fn available_appointments(
    State(state): State<Arc<AppConfig>>,
    Query(params): Query<AvailableAppointmentsQuery>,
) -> Result<Json<Value>, AppError> {
    let queries = AppointmentQueryService::new(&state);

    let appointments = queries
        .available_appointments(params.doctor_id, params.date)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({
        "doctor_id": params.doctor_id,
        "date": params.date,
        "appointments": appointments,
        "total": appointments.len()
    })))
}

// ==============================================================================
// BOOKING / CANCELLATION HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    authorize_patient_scope(&user, request.patient_id)?;

    let booking_service = BookingService::new(&state);

    let appointment = booking_service
        .book_appointment(request)
        .await
        .map_err(|e| match e {
            AppointmentError::NotFound => AppError::NotFound("Appointment not found".to_string()),
            AppointmentError::PatientNotFound => {
                AppError::NotFound("Patient not found".to_string())
            }
            AppointmentError::SlotNotAvailable => {
                AppError::Conflict("Appointment slot no longer available".to_string())
            }
            AppointmentError::InvalidStatusTransition { from, .. } => {
                AppError::Conflict(format!("Appointment cannot be booked from status {}", from))
            }
            AppointmentError::ValidationError(msg) => AppError::BadRequest(msg),
            _ => AppError::Internal(e.to_string()),
        })?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment booked successfully"
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<CancelAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    authorize_patient_scope(&user, request.patient_id)?;

    let booking_service = BookingService::new(&state);

    let appointment = booking_service
        .cancel_appointment(request)
        .await
        .map_err(|e| match e {
            AppointmentError::NotFound => AppError::NotFound(
                "Appointment not found or does not belong to this patient".to_string(),
            ),
            AppointmentError::CancellationWindow(hours) => AppError::Conflict(format!(
                "Cannot cancel within {} hours of the appointment",
                hours
            )),
            AppointmentError::InvalidStatusTransition { from, .. } => {
                AppError::Conflict(format!("Appointment cannot be cancelled from status {}", from))
            }
            _ => AppError::Internal(e.to_string()),
        })?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment cancelled successfully"
    })))
}

// ==============================================================================
// LISTING HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn view_appointments(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Query(params): Query<ViewAppointmentsQuery>,
) -> Result<Json<Value>, AppError> {
    authorize_patient_scope(&user, params.patient_id)?;

    let status = params.status.unwrap_or(AppointmentStatus::Booked);
    let queries = AppointmentQueryService::new(&state);

    let appointments = queries
        .by_patient_and_status(params.patient_id, status)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({
        "patient_id": params.patient_id,
        "status": status,
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let queries = AppointmentQueryService::new(&state);

    let appointment = queries
        .get_appointment(appointment_id)
        .await
        .map_err(|e| match e {
            AppointmentError::NotFound => AppError::NotFound("Appointment not found".to_string()),
            _ => AppError::Internal(e.to_string()),
        })?;

    Ok(Json(json!(appointment)))
}

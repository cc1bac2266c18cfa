use std::sync::Arc;

use chrono::{Duration, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_database::supabase::{
    ignore_duplicates_headers, representation_headers, SupabaseClient,
};

use crate::models::{
    Appointment, AppointmentError, AppointmentStatus, BookAppointmentRequest,
    CancelAppointmentRequest,
};
use crate::services::lifecycle::AppointmentLifecycle;
use crate::services::query::AppointmentQueryService;

/// Minimum notice, in hours, required before a slot's start time for the
/// patient to cancel it.
pub const CANCELLATION_NOTICE_HOURS: i64 = 4;

pub struct BookingService {
    supabase: Arc<SupabaseClient>,
    queries: AppointmentQueryService,
    lifecycle: AppointmentLifecycle,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));
        Self::with_client(supabase)
    }

    pub fn with_client(supabase: Arc<SupabaseClient>) -> Self {
        let queries = AppointmentQueryService::with_client(Arc::clone(&supabase));
        Self {
            supabase,
            queries,
            lifecycle: AppointmentLifecycle::new(),
        }
    }

    /// Book an open slot for a patient. The write is a conditional update
    /// filtered on `is_available=true`; losing the race to another booking
    /// surfaces as `SlotNotAvailable` rather than a silent overwrite.
    pub async fn book_appointment(
        &self,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        info!(
            "Booking appointment {} for patient {}",
            request.appointment_id, request.patient_id
        );

        self.verify_patient_exists(request.patient_id).await?;

        let appointment = self.queries.get_appointment(request.appointment_id).await?;
        self.lifecycle
            .validate_transition(appointment.status, AppointmentStatus::Booked)?;

        let path = format!(
            "/rest/v1/appointments?id=eq.{}&is_available=eq.true",
            request.appointment_id
        );
        let body = json!({
            "patient_id": request.patient_id,
            "is_available": false,
            "status": AppointmentStatus::Booked,
            "symptoms": request.symptoms,
        });

        let updated: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(body),
                Some(representation_headers()),
            )
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        // The slot existed a moment ago, so an empty update means another
        // booking claimed it in between.
        let Some(row) = updated.into_iter().next() else {
            warn!(
                "Appointment {} was taken before patient {} could book it",
                request.appointment_id, request.patient_id
            );
            return Err(AppointmentError::SlotNotAvailable);
        };

        let booked: Appointment = serde_json::from_value(row).map_err(|e| {
            AppointmentError::DatabaseError(format!("Failed to parse appointment: {}", e))
        })?;

        self.link_patient_to_doctor(request.patient_id, booked.doctor_id)
            .await?;

        info!(
            "Appointment {} booked for patient {}",
            booked.id, request.patient_id
        );
        Ok(booked)
    }

    /// Cancel a booked slot, releasing it back to the pool. Requires the
    /// slot to belong to the requesting patient and to start at least
    /// [`CANCELLATION_NOTICE_HOURS`] from now. Recorded medications are
    /// discarded with the reset.
    pub async fn cancel_appointment(
        &self,
        request: CancelAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        info!(
            "Cancelling appointment {} for patient {}",
            request.appointment_id, request.patient_id
        );

        let appointment = self
            .queries
            .get_appointment_for_patient(request.appointment_id, request.patient_id)
            .await?;

        let now = Utc::now().naive_utc();
        if appointment.starts_at() < now + Duration::hours(CANCELLATION_NOTICE_HOURS) {
            warn!(
                "Cancellation of appointment {} rejected: starts at {}, within the notice window",
                appointment.id,
                appointment.starts_at()
            );
            return Err(AppointmentError::CancellationWindow(
                CANCELLATION_NOTICE_HOURS,
            ));
        }

        self.lifecycle
            .validate_transition(appointment.status, AppointmentStatus::Available)?;

        // Medications hang off the booking, not the slot; they go with it.
        let med_path = format!(
            "/rest/v1/medications?appointment_id=eq.{}",
            request.appointment_id
        );
        self.supabase
            .execute(Method::DELETE, &med_path, None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let path = format!("/rest/v1/appointments?id=eq.{}", request.appointment_id);
        let body = json!({
            "status": AppointmentStatus::Available,
            "is_available": true,
            "patient_id": Value::Null,
            "symptoms": Value::Null,
        });

        let updated: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(body),
                Some(representation_headers()),
            )
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let Some(row) = updated.into_iter().next() else {
            return Err(AppointmentError::NotFound);
        };

        let released: Appointment = serde_json::from_value(row).map_err(|e| {
            AppointmentError::DatabaseError(format!("Failed to parse appointment: {}", e))
        })?;

        info!("Appointment {} released back to available", released.id);
        Ok(released)
    }

    /// Doctor-driven status update (complete or cancel a consultation),
    /// validated against the lifecycle table. Releasing a slot back to
    /// available is not expressible here: that path must clear the patient
    /// and medications too, which only cancellation does.
    pub async fn update_status(
        &self,
        appointment_id: i64,
        new_status: AppointmentStatus,
    ) -> Result<Appointment, AppointmentError> {
        debug!(
            "Updating status of appointment {} to {}",
            appointment_id, new_status
        );

        let appointment = self.queries.get_appointment(appointment_id).await?;

        if new_status == AppointmentStatus::Available {
            return Err(AppointmentError::ValidationError(
                "Slots are released through cancellation".to_string(),
            ));
        }

        self.lifecycle
            .validate_transition(appointment.status, new_status)?;

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let body = json!({ "status": new_status });

        let updated: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(body),
                Some(representation_headers()),
            )
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let Some(row) = updated.into_iter().next() else {
            return Err(AppointmentError::NotFound);
        };

        serde_json::from_value(row).map_err(|e| {
            AppointmentError::DatabaseError(format!("Failed to parse appointment: {}", e))
        })
    }

    async fn verify_patient_exists(&self, patient_id: i64) -> Result<(), AppointmentError> {
        let path = format!("/rest/v1/patients?id=eq.{}&select=id", patient_id);
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        if rows.is_empty() {
            return Err(AppointmentError::PatientNotFound);
        }
        Ok(())
    }

    /// Record the patient/doctor relationship as an explicit join row.
    async fn link_patient_to_doctor(
        &self,
        patient_id: i64,
        doctor_id: i64,
    ) -> Result<(), AppointmentError> {
        let body = json!({
            "patient_id": patient_id,
            "doctor_id": doctor_id,
        });

        self.supabase
            .execute_with_headers(
                Method::POST,
                "/rest/v1/patient_doctors?on_conflict=patient_id,doctor_id",
                Some(body),
                Some(ignore_duplicates_headers()),
            )
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))
    }
}

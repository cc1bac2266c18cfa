use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{Appointment, AppointmentError, AppointmentStatus, DoctorSummary};

/// Read-only appointment lookups. List queries return possibly-empty
/// collections; a typed `NotFound` is reserved for by-id lookups.
pub struct AppointmentQueryService {
    supabase: Arc<SupabaseClient>,
}

impl AppointmentQueryService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
        }
    }

    pub fn with_client(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    pub async fn get_appointment(&self, appointment_id: i64) -> Result<Appointment, AppointmentError> {
        debug!("Fetching appointment: {}", appointment_id);

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        self.fetch_one(&path).await
    }

    /// By-id lookup scoped to the owning patient: a row booked by someone
    /// else is indistinguishable from a missing one.
    pub async fn get_appointment_for_patient(
        &self,
        appointment_id: i64,
        patient_id: i64,
    ) -> Result<Appointment, AppointmentError> {
        debug!(
            "Fetching appointment {} for patient {}",
            appointment_id, patient_id
        );

        let path = format!(
            "/rest/v1/appointments?id=eq.{}&patient_id=eq.{}",
            appointment_id, patient_id
        );
        self.fetch_one(&path).await
    }

    /// Doctors who have any slots on the given date.
    pub async fn available_doctors_on(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<DoctorSummary>, AppointmentError> {
        debug!("Finding doctors with slots on {}", date);

        let path = format!(
            "/rest/v1/appointments?appointment_date=eq.{}&select=doctor_id",
            date
        );
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let doctor_ids: BTreeSet<i64> = rows
            .iter()
            .filter_map(|row| row.get("doctor_id").and_then(Value::as_i64))
            .collect();

        if doctor_ids.is_empty() {
            return Ok(vec![]);
        }

        let id_list = doctor_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let path = format!(
            "/rest/v1/doctors?id=in.({})&select=id,first_name,last_name,specialization&order=id.asc",
            id_list
        );

        let doctors: Vec<DoctorSummary> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        Ok(doctors)
    }

    /// Open slots for one doctor on one date.
    pub async fn available_appointments(
        &self,
        doctor_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        debug!(
            "Finding available appointments for doctor {} on {}",
            doctor_id, date
        );

        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&appointment_date=eq.{}&is_available=eq.true&order=start_time.asc",
            doctor_id, date
        );
        self.fetch_list(&path).await
    }

    pub async fn by_patient_and_status(
        &self,
        patient_id: i64,
        status: AppointmentStatus,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        debug!(
            "Finding appointments for patient {} with status {}",
            patient_id, status
        );

        let path = format!(
            "/rest/v1/appointments?patient_id=eq.{}&status=eq.{}&order=appointment_date.asc,start_time.asc",
            patient_id, status
        );
        self.fetch_list(&path).await
    }

    /// Full schedule (available and booked) for a doctor on one date.
    pub async fn for_doctor_on(
        &self,
        doctor_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        debug!("Fetching schedule for doctor {} on {}", doctor_id, date);

        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&appointment_date=eq.{}&order=start_time.asc",
            doctor_id, date
        );
        self.fetch_list(&path).await
    }

    async fn fetch_one(&self, path: &str) -> Result<Appointment, AppointmentError> {
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, path, None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(AppointmentError::NotFound);
        }

        serde_json::from_value(result[0].clone()).map_err(|e| {
            AppointmentError::DatabaseError(format!("Failed to parse appointment: {}", e))
        })
    }

    async fn fetch_list(&self, path: &str) -> Result<Vec<Appointment>, AppointmentError> {
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, path, None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Appointment>, _>>()
            .map_err(|e| {
                AppointmentError::DatabaseError(format!("Failed to parse appointments: {}", e))
            })
    }
}

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::supabase::{representation_headers, SupabaseClient};
use shared_utils::password::hash_password;
use shared_utils::validation::{collect_issues, ProfileValidator};

use appointment_cell::services::slots::{end_of_month, SlotGenerationService};

use crate::models::{Doctor, DoctorError, PatientSummary, RegisterDoctorRequest, UpdateDoctorRequest};

pub struct DoctorService {
    supabase: Arc<SupabaseClient>,
    slots: SlotGenerationService,
    validator: ProfileValidator,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));
        let slots = SlotGenerationService::with_client(Arc::clone(&supabase));
        Self {
            supabase,
            slots,
            validator: ProfileValidator::new(),
        }
    }

    /// Register a doctor and pre-generate their half-hour slot grid from
    /// today through the end of the current month.
    pub async fn register_doctor(
        &self,
        request: RegisterDoctorRequest,
    ) -> Result<Doctor, DoctorError> {
        self.validate_profile(
            &request.first_name,
            &request.gender,
            &request.email,
            &request.phone_no,
            request.age,
            &request.password,
            &request.specialization,
        )?;

        let password_hash = hash_password(&request.password)
            .map_err(|e| DoctorError::Internal(format!("Failed to hash password: {}", e)))?;

        let body = json!({
            "first_name": request.first_name,
            "last_name": request.last_name,
            "age": request.age,
            "gender": request.gender,
            "email": request.email,
            "phone_no": request.phone_no,
            "password": password_hash,
            "specialization": request.specialization,
        });

        let created: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/doctors",
                Some(body),
                Some(representation_headers()),
            )
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        let Some(row) = created.into_iter().next() else {
            return Err(DoctorError::DatabaseError(
                "Failed to create doctor".to_string(),
            ));
        };

        let doctor: Doctor = serde_json::from_value(row)
            .map_err(|e| DoctorError::DatabaseError(format!("Failed to parse doctor: {}", e)))?;

        let today = Utc::now().date_naive();
        self.slots
            .generate_for_doctor(doctor.id, today, end_of_month(today))
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        info!("Doctor {} registered with slots through end of month", doctor.id);
        Ok(doctor)
    }

    pub async fn get_doctor(&self, doctor_id: i64) -> Result<Doctor, DoctorError> {
        debug!("Fetching doctor: {}", doctor_id);

        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(DoctorError::NotFound);
        }

        serde_json::from_value(result[0].clone())
            .map_err(|e| DoctorError::DatabaseError(format!("Failed to parse doctor: {}", e)))
    }

    pub async fn list_doctors(&self) -> Result<Vec<Doctor>, DoctorError> {
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, "/rest/v1/doctors?order=id.asc", None)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Doctor>, _>>()
            .map_err(|e| DoctorError::DatabaseError(format!("Failed to parse doctors: {}", e)))
    }

    pub async fn update_doctor(
        &self,
        doctor_id: i64,
        request: UpdateDoctorRequest,
    ) -> Result<Doctor, DoctorError> {
        // Surface a typed not-found before attempting the write.
        self.get_doctor(doctor_id).await?;

        self.validate_profile(
            &request.first_name,
            &request.gender,
            &request.email,
            &request.phone_no,
            request.age,
            &request.password,
            &request.specialization,
        )?;

        let password_hash = hash_password(&request.password)
            .map_err(|e| DoctorError::Internal(format!("Failed to hash password: {}", e)))?;

        let body = json!({
            "first_name": request.first_name,
            "last_name": request.last_name,
            "age": request.age,
            "gender": request.gender,
            "email": request.email,
            "phone_no": request.phone_no,
            "password": password_hash,
            "specialization": request.specialization,
        });

        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let updated: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(body),
                Some(representation_headers()),
            )
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        let Some(row) = updated.into_iter().next() else {
            return Err(DoctorError::NotFound);
        };

        serde_json::from_value(row)
            .map_err(|e| DoctorError::DatabaseError(format!("Failed to parse doctor: {}", e)))
    }

    pub async fn delete_doctor(&self, doctor_id: i64) -> Result<(), DoctorError> {
        self.get_doctor(doctor_id).await?;

        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        self.supabase
            .execute(Method::DELETE, &path, None)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        info!("Doctor {} deleted", doctor_id);
        Ok(())
    }

    /// Patients linked to this doctor through booked appointments.
    pub async fn patients_of(&self, doctor_id: i64) -> Result<Vec<PatientSummary>, DoctorError> {
        let path = format!(
            "/rest/v1/patient_doctors?doctor_id=eq.{}&select=patient_id",
            doctor_id
        );
        let links: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        let patient_ids: BTreeSet<i64> = links
            .iter()
            .filter_map(|row| row.get("patient_id").and_then(Value::as_i64))
            .collect();

        if patient_ids.is_empty() {
            return Ok(vec![]);
        }

        let id_list = patient_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let path = format!(
            "/rest/v1/patients?id=in.({})&select=id,first_name,last_name,age,gender,email,phone_no,medical_history&order=id.asc",
            id_list
        );

        let patients: Vec<PatientSummary> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        Ok(patients)
    }

    #[allow(clippy::too_many_arguments)]
    fn validate_profile(
        &self,
        first_name: &str,
        gender: &str,
        email: &str,
        phone_no: &str,
        age: i32,
        password: &str,
        specialization: &str,
    ) -> Result<(), DoctorError> {
        collect_issues(vec![
            self.validator.require("First name", first_name),
            self.validator.require("Gender", gender),
            self.validator.require("Specialization", specialization),
            self.validator.email(email),
            self.validator.phone(phone_no),
            self.validator.age(age),
            self.validator.password(password),
        ])
        .map_err(DoctorError::ValidationError)
    }
}

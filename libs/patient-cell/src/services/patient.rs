use std::collections::BTreeSet;
use std::sync::Arc;

use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::supabase::{representation_headers, SupabaseClient};
use shared_utils::password::hash_password;
use shared_utils::validation::{collect_issues, ProfileValidator};

use crate::models::{
    DoctorSummary, Patient, PatientError, RegisterPatientRequest, UpdatePatientRequest,
};

pub struct PatientService {
    supabase: Arc<SupabaseClient>,
    validator: ProfileValidator,
}

impl PatientService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
            validator: ProfileValidator::new(),
        }
    }

    pub async fn register_patient(
        &self,
        request: RegisterPatientRequest,
    ) -> Result<Patient, PatientError> {
        self.validate_profile(
            &request.first_name,
            &request.gender,
            &request.email,
            &request.phone_no,
            request.age,
            &request.password,
        )?;

        let password_hash = hash_password(&request.password)
            .map_err(|e| PatientError::Internal(format!("Failed to hash password: {}", e)))?;

        let body = json!({
            "first_name": request.first_name,
            "last_name": request.last_name,
            "age": request.age,
            "gender": request.gender,
            "email": request.email,
            "phone_no": request.phone_no,
            "password": password_hash,
            "medical_history": request.medical_history,
        });

        let created: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/patients",
                Some(body),
                Some(representation_headers()),
            )
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        let Some(row) = created.into_iter().next() else {
            return Err(PatientError::DatabaseError(
                "Failed to create patient".to_string(),
            ));
        };

        let patient: Patient = serde_json::from_value(row)
            .map_err(|e| PatientError::DatabaseError(format!("Failed to parse patient: {}", e)))?;

        info!("Patient {} registered", patient.id);
        Ok(patient)
    }

    pub async fn get_patient(&self, patient_id: i64) -> Result<Patient, PatientError> {
        debug!("Fetching patient: {}", patient_id);

        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(PatientError::NotFound);
        }

        serde_json::from_value(result[0].clone())
            .map_err(|e| PatientError::DatabaseError(format!("Failed to parse patient: {}", e)))
    }

    pub async fn list_patients(&self) -> Result<Vec<Patient>, PatientError> {
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, "/rest/v1/patients?order=id.asc", None)
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Patient>, _>>()
            .map_err(|e| PatientError::DatabaseError(format!("Failed to parse patients: {}", e)))
    }

    pub async fn update_patient(
        &self,
        patient_id: i64,
        request: UpdatePatientRequest,
    ) -> Result<Patient, PatientError> {
        self.get_patient(patient_id).await?;

        self.validate_profile(
            &request.first_name,
            &request.gender,
            &request.email,
            &request.phone_no,
            request.age,
            &request.password,
        )?;

        let password_hash = hash_password(&request.password)
            .map_err(|e| PatientError::Internal(format!("Failed to hash password: {}", e)))?;

        let body = json!({
            "first_name": request.first_name,
            "last_name": request.last_name,
            "age": request.age,
            "gender": request.gender,
            "email": request.email,
            "phone_no": request.phone_no,
            "password": password_hash,
            "medical_history": request.medical_history,
        });

        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        let updated: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(body),
                Some(representation_headers()),
            )
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        let Some(row) = updated.into_iter().next() else {
            return Err(PatientError::NotFound);
        };

        serde_json::from_value(row)
            .map_err(|e| PatientError::DatabaseError(format!("Failed to parse patient: {}", e)))
    }

    pub async fn delete_patient(&self, patient_id: i64) -> Result<(), PatientError> {
        self.get_patient(patient_id).await?;

        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        self.supabase
            .execute(Method::DELETE, &path, None)
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        info!("Patient {} deleted", patient_id);
        Ok(())
    }

    /// Doctors linked to this patient through booked appointments.
    pub async fn doctors_of(&self, patient_id: i64) -> Result<Vec<DoctorSummary>, PatientError> {
        let path = format!(
            "/rest/v1/patient_doctors?patient_id=eq.{}&select=doctor_id",
            patient_id
        );
        let links: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        let doctor_ids: BTreeSet<i64> = links
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
            "/rest/v1/doctors?id=in.({})&select=id,first_name,last_name,email,specialization&order=id.asc",
            id_list
        );

        let doctors: Vec<DoctorSummary> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        Ok(doctors)
    }

    fn validate_profile(
        &self,
        first_name: &str,
        gender: &str,
        email: &str,
        phone_no: &str,
        age: i32,
        password: &str,
    ) -> Result<(), PatientError> {
        collect_issues(vec![
            self.validator.require("First name", first_name),
            self.validator.require("Gender", gender),
            self.validator.email(email),
            self.validator.phone(phone_no),
            self.validator.age(age),
            self.validator.password(password),
        ])
        .map_err(PatientError::ValidationError)
    }
}

use std::sync::Arc;

use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::supabase::{representation_headers, SupabaseClient};

use crate::models::{
    CreateMedicationRequest, Medication, MedicationError, UpdateMedicationRequest,
};

pub struct MedicationService {
    supabase: Arc<SupabaseClient>,
}

impl MedicationService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
        }
    }

    /// Attach a medication to an existing appointment.
    pub async fn add_to_appointment(
        &self,
        appointment_id: i64,
        request: CreateMedicationRequest,
    ) -> Result<Medication, MedicationError> {
        self.verify_appointment_exists(appointment_id).await?;

        let body = json!({
            "appointment_id": appointment_id,
            "name": request.name,
            "dosage": request.dosage,
            "frequency": request.frequency,
            "instructions": request.instructions,
        });

        let created: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/medications",
                Some(body),
                Some(representation_headers()),
            )
            .await
            .map_err(|e| MedicationError::DatabaseError(e.to_string()))?;

        let Some(row) = created.into_iter().next() else {
            return Err(MedicationError::DatabaseError(
                "Failed to create medication".to_string(),
            ));
        };

        let medication: Medication = serde_json::from_value(row).map_err(|e| {
            MedicationError::DatabaseError(format!("Failed to parse medication: {}", e))
        })?;

        info!(
            "Medication {} added to appointment {}",
            medication.id, appointment_id
        );
        Ok(medication)
    }

    pub async fn get_medication(&self, medication_id: i64) -> Result<Medication, MedicationError> {
        debug!("Fetching medication: {}", medication_id);

        let path = format!("/rest/v1/medications?id=eq.{}", medication_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| MedicationError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(MedicationError::NotFound);
        }

        serde_json::from_value(result[0].clone()).map_err(|e| {
            MedicationError::DatabaseError(format!("Failed to parse medication: {}", e))
        })
    }

    /// Full replacement of an existing medication's fields.
    pub async fn update_medication(
        &self,
        medication_id: i64,
        request: UpdateMedicationRequest,
    ) -> Result<Medication, MedicationError> {
        self.get_medication(medication_id).await?;

        let body = json!({
            "name": request.name,
            "dosage": request.dosage,
            "frequency": request.frequency,
            "instructions": request.instructions,
        });

        let path = format!("/rest/v1/medications?id=eq.{}", medication_id);
        let updated: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(body),
                Some(representation_headers()),
            )
            .await
            .map_err(|e| MedicationError::DatabaseError(e.to_string()))?;

        let Some(row) = updated.into_iter().next() else {
            return Err(MedicationError::NotFound);
        };

        serde_json::from_value(row).map_err(|e| {
            MedicationError::DatabaseError(format!("Failed to parse medication: {}", e))
        })
    }

    pub async fn remove_medication(&self, medication_id: i64) -> Result<(), MedicationError> {
        self.get_medication(medication_id).await?;

        let path = format!("/rest/v1/medications?id=eq.{}", medication_id);
        self.supabase
            .execute(Method::DELETE, &path, None)
            .await
            .map_err(|e| MedicationError::DatabaseError(e.to_string()))?;

        info!("Medication {} removed", medication_id);
        Ok(())
    }

    /// All medications for an appointment; empty when none were prescribed.
    pub async fn medications_for_appointment(
        &self,
        appointment_id: i64,
    ) -> Result<Vec<Medication>, MedicationError> {
        self.verify_appointment_exists(appointment_id).await?;

        let path = format!(
            "/rest/v1/medications?appointment_id=eq.{}&order=id.asc",
            appointment_id
        );
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| MedicationError::DatabaseError(e.to_string()))?;

        result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Medication>, _>>()
            .map_err(|e| {
                MedicationError::DatabaseError(format!("Failed to parse medications: {}", e))
            })
    }

    async fn verify_appointment_exists(&self, appointment_id: i64) -> Result<(), MedicationError> {
        let path = format!("/rest/v1/appointments?id=eq.{}&select=id", appointment_id);
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| MedicationError::DatabaseError(e.to_string()))?;

        if rows.is_empty() {
            return Err(MedicationError::AppointmentNotFound);
        }
        Ok(())
    }
}

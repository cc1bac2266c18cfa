use serde::{Deserialize, Serialize};

/// A prescribed medication. Every medication belongs to exactly one
/// appointment; cancelling the appointment discards its medications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medication {
    pub id: i64,
    pub appointment_id: i64,
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMedicationRequest {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub instructions: Option<String>,
}

/// Full-replacement update of a medication's fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateMedicationRequest {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum MedicationError {
    #[error("Medication not found")]
    NotFound,

    #[error("Appointment not found")]
    AppointmentNotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

use std::sync::Arc;

use chrono::{Datelike, Days, Duration, Months, NaiveDate, NaiveTime};
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::supabase::{representation_headers, SupabaseClient};

use crate::models::{Appointment, AppointmentError, AppointmentStatus, NewSlot};

/// Clinic opening hours: slots run 09:00-19:00 in 30-minute steps,
/// 20 slots per day.
pub const SLOT_MINUTES: i64 = 30;

pub fn opening_time() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap()
}

pub fn closing_time() -> NaiveTime {
    NaiveTime::from_hms_opt(19, 0, 0).unwrap()
}

/// Build the slot rows for one doctor across an inclusive date range.
/// Pure: persistence happens in [`SlotGenerationService::generate_for_doctor`].
/// There is no overlap check against existing rows; re-invoking over the same
/// range duplicates slots.
pub fn build_slots(doctor_id: i64, start_date: NaiveDate, end_date: NaiveDate) -> Vec<NewSlot> {
    let mut slots = Vec::new();
    let mut date = start_date;

    while date <= end_date {
        let mut start_time = opening_time();

        while start_time < closing_time() {
            let end_time = start_time + Duration::minutes(SLOT_MINUTES);

            slots.push(NewSlot {
                doctor_id,
                appointment_date: date,
                start_time,
                end_time,
                is_available: true,
                status: AppointmentStatus::Available,
            });

            start_time = end_time;
        }

        date = match date.checked_add_days(Days::new(1)) {
            Some(next) => next,
            None => break,
        };
    }

    slots
}

/// Last day of the month `date` falls in.
pub fn end_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1)
        .and_then(|first| first.checked_add_months(Months::new(1)))
        .and_then(|next_month| next_month.checked_sub_days(Days::new(1)))
        .unwrap_or(date)
}

pub struct SlotGenerationService {
    supabase: Arc<SupabaseClient>,
}

impl SlotGenerationService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
        }
    }

    pub fn with_client(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    /// Generate and persist the slot grid for a doctor in one bulk insert.
    pub async fn generate_for_doctor(
        &self,
        doctor_id: i64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        if start_date > end_date {
            return Err(AppointmentError::ValidationError(
                "Start date must not be after end date".to_string(),
            ));
        }

        let slots = build_slots(doctor_id, start_date, end_date);
        debug!(
            "Generating {} slots for doctor {} from {} to {}",
            slots.len(),
            doctor_id,
            start_date,
            end_date
        );

        let body = serde_json::to_value(&slots)
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let created: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/appointments",
                Some(body),
                Some(representation_headers()),
            )
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let appointments: Vec<Appointment> = created
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Appointment>, _>>()
            .map_err(|e| {
                AppointmentError::DatabaseError(format!("Failed to parse appointments: {}", e))
            })?;

        info!(
            "Created {} appointment slots for doctor {}",
            appointments.len(),
            doctor_id
        );
        Ok(appointments)
    }
}

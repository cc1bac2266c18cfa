use tracing::{debug, warn};

use crate::models::{AppointmentError, AppointmentStatus};

/// Transition table for the slot lifecycle. A booked slot either completes,
/// is cancelled outright, or reverts to available when the patient cancels
/// with enough notice; completed and cancelled are terminal.
pub struct AppointmentLifecycle;

impl AppointmentLifecycle {
    pub fn new() -> Self {
        Self
    }

    pub fn valid_transitions(&self, from: AppointmentStatus) -> &'static [AppointmentStatus] {
        match from {
            AppointmentStatus::Available => &[AppointmentStatus::Booked],
            AppointmentStatus::Booked => &[
                AppointmentStatus::Available,
                AppointmentStatus::Cancelled,
                AppointmentStatus::Completed,
            ],
            // Terminal states
            AppointmentStatus::Cancelled => &[],
            AppointmentStatus::Completed => &[],
        }
    }

    pub fn validate_transition(
        &self,
        from: AppointmentStatus,
        to: AppointmentStatus,
    ) -> Result<(), AppointmentError> {
        debug!("Validating status transition {} -> {}", from, to);

        if !self.valid_transitions(from).contains(&to) {
            warn!("Invalid status transition attempted: {} -> {}", from, to);
            return Err(AppointmentError::InvalidStatusTransition { from, to });
        }

        Ok(())
    }
}

impl Default for AppointmentLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

use std::sync::Arc;

use tracing::debug;

use crate::error::BookingError;
use crate::models::{AppointmentSummary, QueueStatusView};
use crate::store::BookingStore;

pub struct HistoryService {
    store: Arc<dyn BookingStore>,
}

impl HistoryService {
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self { store }
    }

    pub async fn my_appointments(
        &self,
        patient_nik: &str,
    ) -> Result<Vec<AppointmentSummary>, BookingError> {
        debug!("Listing appointments for patient");
        Ok(self.store.patient_appointments(patient_nik).await?)
    }

    /// Queue position for one of the patient's registrations, with the
    /// number currently being served on that date.
    pub async fn queue_status(
        &self,
        patient_nik: &str,
        registration_id: i64,
    ) -> Result<QueueStatusView, BookingError> {
        let ticket = self
            .store
            .registration_queue(patient_nik, registration_id)
            .await?
            .ok_or_else(|| {
                BookingError::NotFound("Queue entry not found for this appointment".to_string())
            })?;

        let current_serving = self.store.current_serving(ticket.queue_date).await?;

        Ok(QueueStatusView {
            queue_number: ticket.queue_number,
            queue_date: ticket.queue_date,
            status: ticket.status,
            priority: ticket.priority,
            doctor_name: ticket.doctor_name,
            current_serving,
        })
    }
}

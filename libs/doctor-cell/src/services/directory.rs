use std::sync::Arc;

use tracing::debug;

use crate::models::{Doctor, DoctorError};
use crate::store::DoctorStore;

pub struct DirectoryService {
    store: Arc<dyn DoctorStore>,
}

impl DirectoryService {
    pub fn new(store: Arc<dyn DoctorStore>) -> Self {
        Self { store }
    }

    pub async fn list_doctors(&self) -> Result<Vec<Doctor>, DoctorError> {
        debug!("Listing active doctors");
        let records = self.store.active_doctors().await?;
        Ok(records.into_iter().map(Doctor::from).collect())
    }

    pub async fn doctor_schedules(&self, doctor_id: i64) -> Result<Doctor, DoctorError> {
        debug!("Fetching schedules for doctor {}", doctor_id);
        let record = self
            .store
            .active_doctor(doctor_id)
            .await?
            .ok_or(DoctorError::NotFound)?;
        Ok(Doctor::from(record))
    }
}

//! In-memory store fake for tests that exercise directory logic without a
//! live database.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use shared_database::StoreError;

use crate::models::DoctorRecord;
use crate::store::DoctorStore;

#[derive(Default)]
pub struct MemoryDoctorStore {
    doctors: Mutex<BTreeMap<i64, (DoctorRecord, bool)>>,
}

impl MemoryDoctorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_doctor(&self, id: i64, full_name: &str, schedule: Option<&str>) {
        self.add_doctor_full(id, full_name, None, schedule, true);
    }

    pub fn add_doctor_full(
        &self,
        id: i64,
        full_name: &str,
        specialization: Option<&str>,
        schedule: Option<&str>,
        is_active: bool,
    ) {
        let record = DoctorRecord {
            id,
            full_name: full_name.to_string(),
            specialization: specialization.map(String::from),
            phone: None,
            email: None,
            practice_schedule: schedule.map(String::from),
        };
        self.doctors
            .lock()
            .unwrap()
            .insert(id, (record, is_active));
    }
}

#[async_trait]
impl DoctorStore for MemoryDoctorStore {
    async fn active_doctors(&self) -> Result<Vec<DoctorRecord>, StoreError> {
        let doctors = self.doctors.lock().unwrap();
        let mut records: Vec<_> = doctors
            .values()
            .filter(|(_, active)| *active)
            .map(|(record, _)| record.clone())
            .collect();
        records.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(records)
    }

    async fn active_doctor(&self, doctor_id: i64) -> Result<Option<DoctorRecord>, StoreError> {
        let doctors = self.doctors.lock().unwrap();
        Ok(doctors
            .get(&doctor_id)
            .filter(|(_, active)| *active)
            .map(|(record, _)| record.clone()))
    }
}

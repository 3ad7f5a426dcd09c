use std::sync::Arc;

use shared_config::AppConfig;

pub mod handlers;
pub mod models;
pub mod router;
pub mod schedule;
pub mod services;
pub mod store;
pub mod testing;

pub use models::{Doctor, DoctorError};
pub use schedule::{PracticeHours, WeeklySchedule};

/// Per-cell router state: the configuration plus the cell's storage seam.
#[derive(Clone)]
pub struct DoctorState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn store::DoctorStore>,
}

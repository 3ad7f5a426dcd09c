use std::sync::Arc;

use shared_config::AppConfig;

pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod store;
pub mod testing;

pub use error::QueueError;
pub use models::{QueueBoard, QueueBoardRow};
pub use services::board::BoardService;
pub use services::transitions::TransitionService;

/// Per-cell router state for the admin queue surface.
#[derive(Clone)]
pub struct QueueState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn store::QueueStore>,
}

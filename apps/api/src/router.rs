use std::sync::Arc;

use axum::{routing::get, Router};

use booking_cell::router::booking_routes;
use booking_cell::store::PgBookingStore;
use booking_cell::BookingState;
use doctor_cell::router::doctor_routes;
use doctor_cell::store::PgDoctorStore;
use doctor_cell::DoctorState;
use queue_cell::router::queue_routes;
use queue_cell::store::PgQueueStore;
use queue_cell::QueueState;
use shared_config::AppConfig;
use shared_database::Database;

pub fn create_router(config: Arc<AppConfig>, db: Database) -> Router {
    let booking_state = Arc::new(BookingState {
        config: config.clone(),
        store: Arc::new(PgBookingStore::new(db.clone())),
    });
    let doctor_state = Arc::new(DoctorState {
        config: config.clone(),
        store: Arc::new(PgDoctorStore::new(db.clone())),
    });
    let queue_state = Arc::new(QueueState {
        config: config.clone(),
        store: Arc::new(PgQueueStore::new(db)),
    });

    Router::new()
        .route("/", get(|| async { "Clinic Queue API is running!" }))
        .nest(
            "/patient",
            booking_routes(booking_state).merge(doctor_routes(doctor_state)),
        )
        .nest("/admin", queue_routes(queue_state))
}

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::BookingState;

pub fn booking_routes(state: Arc<BookingState>) -> Router {
    Router::new()
        .route(
            "/appointments",
            post(handlers::create_appointment).get(handlers::list_my_appointments),
        )
        .route(
            "/appointments/{registration_id}/queue",
            get(handlers::get_queue_status),
        )
        .route(
            "/doctors/{doctor_id}/timeslots",
            get(handlers::get_timeslots),
        )
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ))
        .with_state(state)
}

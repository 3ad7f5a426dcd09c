use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::QueueState;

pub fn queue_routes(state: Arc<QueueState>) -> Router {
    Router::new()
        .route("/queue", get(handlers::get_board))
        .route("/queue/{queue_id}/call", post(handlers::call_entry))
        .route("/queue/{queue_id}/start", post(handlers::start_entry))
        .route("/queue/{queue_id}/finish", post(handlers::finish_entry))
        .route("/queue/{queue_id}/cancel", post(handlers::cancel_entry))
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ))
        .with_state(state)
}

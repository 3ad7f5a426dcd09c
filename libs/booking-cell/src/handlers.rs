use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::require_role;

use crate::models::{BookingConfirmation, CreateAppointmentRequest};
use crate::services::allocator::BookingService;
use crate::services::history::HistoryService;
use crate::BookingState;

#[derive(Debug, Deserialize)]
pub struct TimeslotQuery {
    pub date: NaiveDate,
}

#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<Arc<BookingState>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<BookingConfirmation>), AppError> {
    require_role(&user, "patient")?;

    let service = BookingService::new(state.store.clone(), state.config.slot_capacity);
    let confirmation = service.create_appointment(&user.id, &request).await?;

    Ok((StatusCode::CREATED, Json(confirmation)))
}

#[axum::debug_handler]
pub async fn get_timeslots(
    State(state): State<Arc<BookingState>>,
    Extension(user): Extension<User>,
    Path(doctor_id): Path<i64>,
    Query(query): Query<TimeslotQuery>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, "patient")?;

    let service = BookingService::new(state.store.clone(), state.config.slot_capacity);
    let day = service.available_timeslots(doctor_id, query.date).await?;

    Ok(Json(json!(day)))
}

#[axum::debug_handler]
pub async fn list_my_appointments(
    State(state): State<Arc<BookingState>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, "patient")?;

    let service = HistoryService::new(state.store.clone());
    let appointments = service.my_appointments(&user.id).await?;

    Ok(Json(json!({ "appointments": appointments })))
}

#[axum::debug_handler]
pub async fn get_queue_status(
    State(state): State<Arc<BookingState>>,
    Extension(user): Extension<User>,
    Path(registration_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, "patient")?;

    let service = HistoryService::new(state.store.clone());
    let status = service.queue_status(&user.id, registration_id).await?;

    Ok(Json(json!(status)))
}

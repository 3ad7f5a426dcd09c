use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Value};

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::require_role;

use crate::services::DirectoryService;
use crate::DoctorState;

#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<Arc<DoctorState>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, "patient")?;

    let service = DirectoryService::new(state.store.clone());
    let doctors = service.list_doctors().await?;

    Ok(Json(json!({ "doctors": doctors })))
}

#[axum::debug_handler]
pub async fn get_doctor_schedules(
    State(state): State<Arc<DoctorState>>,
    Extension(user): Extension<User>,
    Path(doctor_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, "patient")?;

    let service = DirectoryService::new(state.store.clone());
    let doctor = service.doctor_schedules(doctor_id).await?;

    Ok(Json(json!({
        "doctor": {
            "full_name": doctor.full_name,
            "specialization": doctor.specialization,
        },
        "schedules": doctor.schedules,
    })))
}

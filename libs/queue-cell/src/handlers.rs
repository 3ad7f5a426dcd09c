use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::require_role;

use crate::services::board::BoardService;
use crate::services::transitions::TransitionService;
use crate::QueueState;

#[derive(Debug, Deserialize)]
pub struct BoardQuery {
    pub date: Option<NaiveDate>,
}

#[axum::debug_handler]
pub async fn get_board(
    State(state): State<Arc<QueueState>>,
    Extension(user): Extension<User>,
    Query(query): Query<BoardQuery>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, "admin")?;

    let date = query.date.unwrap_or_else(|| chrono::Utc::now().date_naive());
    let service = BoardService::new(state.store.clone());
    let board = service.board(date).await?;

    Ok(Json(json!(board)))
}

#[axum::debug_handler]
pub async fn call_entry(
    State(state): State<Arc<QueueState>>,
    Extension(user): Extension<User>,
    Path(queue_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, "admin")?;

    let service = TransitionService::new(state.store.clone());
    let outcome = service.call(queue_id).await?;

    Ok(Json(json!(outcome)))
}

#[axum::debug_handler]
pub async fn start_entry(
    State(state): State<Arc<QueueState>>,
    Extension(user): Extension<User>,
    Path(queue_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, "admin")?;

    let service = TransitionService::new(state.store.clone());
    let outcome = service.start(queue_id).await?;

    Ok(Json(json!(outcome)))
}

#[axum::debug_handler]
pub async fn finish_entry(
    State(state): State<Arc<QueueState>>,
    Extension(user): Extension<User>,
    Path(queue_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, "admin")?;

    let service = TransitionService::new(state.store.clone());
    let outcome = service.finish(queue_id).await?;

    Ok(Json(json!(outcome)))
}

#[axum::debug_handler]
pub async fn cancel_entry(
    State(state): State<Arc<QueueState>>,
    Extension(user): Extension<User>,
    Path(queue_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, "admin")?;

    let service = TransitionService::new(state.store.clone());
    let outcome = service.cancel(queue_id).await?;

    Ok(Json(json!(outcome)))
}

// 活動、報名與出席

use axum::{extract::State, http::StatusCode};
use serde::Deserialize;

use crate::api::auth::{AdminUser, CurrentUser};
use crate::api::extract::{Json, Path};
use crate::api::AppState;
use crate::domain::model::{Event, NewEvent, Participation};
use crate::utils::error::CizError;

#[derive(Debug, Deserialize)]
pub struct AttendanceRequest {
    pub employee_id: i64,
    pub attended: bool,
}

/// GET /api/events
pub async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<Vec<Event>>, CizError> {
    Ok(Json(state.events.list().await?))
}

/// POST /api/events
pub async fn create(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(event): Json<NewEvent>,
) -> Result<(StatusCode, Json<Event>), CizError> {
    let created = state.events.create(event).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/events/{id}/participants
pub async fn participants(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(event_id): Path<i64>,
) -> Result<Json<Vec<Participation>>, CizError> {
    Ok(Json(state.events.participants(event_id).await?))
}

/// POST /api/events/{id}/join
///
/// 以登入使用者對應的社員身分報名
pub async fn join(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(event_id): Path<i64>,
) -> Result<(StatusCode, Json<Participation>), CizError> {
    let employee_id = principal.employee_id.ok_or_else(|| CizError::Forbidden {
        message: format!("user {} is not linked to an employee", principal.user.id),
    })?;
    let participation = state.events.join(event_id, employee_id).await?;
    Ok((StatusCode::CREATED, Json(participation)))
}

/// POST /api/events/{id}/attendance
pub async fn attendance(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(event_id): Path<i64>,
    Json(request): Json<AttendanceRequest>,
) -> Result<Json<Participation>, CizError> {
    let participation = state
        .events
        .mark_attendance(event_id, request.employee_id, request.attended)
        .await?;
    Ok(Json(participation))
}

// ciz 餘額、歷史與增減

use axum::extract::State;
use serde::Deserialize;

use crate::api::auth::{AdminUser, CurrentUser};
use crate::api::extract::{Json, Path, Query};
use crate::api::AppState;
use crate::domain::model::{CizBalance, CizTransaction, Principal};
use crate::utils::error::CizError;

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct CizRequest {
    pub employee_id: i64,
    pub amount: i64,
    pub reason: String,
}

/// 一般成員只能查看自己的點數
fn ensure_can_view(principal: &Principal, employee_id: i64) -> Result<(), CizError> {
    if principal.is_admin() || principal.employee_id == Some(employee_id) {
        Ok(())
    } else {
        Err(CizError::Forbidden {
            message: format!(
                "user {} cannot view ciz of employee {}",
                principal.user.id, employee_id
            ),
        })
    }
}

/// GET /api/employees/{id}/ciz
pub async fn balance(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(employee_id): Path<i64>,
) -> Result<Json<CizBalance>, CizError> {
    ensure_can_view(&principal, employee_id)?;
    Ok(Json(state.ciz.balance(employee_id).await?))
}

/// GET /api/employees/{id}/ciz/history
pub async fn history(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(employee_id): Path<i64>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<CizTransaction>>, CizError> {
    ensure_can_view(&principal, employee_id)?;
    Ok(Json(state.ciz.history(employee_id, query.limit).await?))
}

/// POST /api/ciz/grant
pub async fn grant(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(request): Json<CizRequest>,
) -> Result<Json<CizBalance>, CizError> {
    let balance = state
        .ciz
        .grant(request.employee_id, request.amount, &request.reason)
        .await?;
    Ok(Json(balance))
}

/// POST /api/ciz/deduct
pub async fn deduct(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(request): Json<CizRequest>,
) -> Result<Json<CizBalance>, CizError> {
    let balance = state
        .ciz
        .deduct(request.employee_id, request.amount, &request.reason)
        .await?;
    Ok(Json(balance))
}

// 登入與目前使用者

use axum::extract::State;
use serde::Deserialize;

use crate::api::auth::CurrentUser;
use crate::api::extract::Json;
use crate::api::AppState;
use crate::domain::model::{Principal, Session};
use crate::utils::error::CizError;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Session>, CizError> {
    let session = state.auth.login(&request.email, &request.password).await?;
    Ok(Json(session))
}

/// GET /api/me
pub async fn me(CurrentUser(principal): CurrentUser) -> Json<Principal> {
    Json(principal)
}

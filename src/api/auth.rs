// Bearer token 驗證用的 extractor

use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};

use crate::api::AppState;
use crate::app::require_admin;
use crate::domain::model::Principal;
use crate::utils::error::CizError;

/// 任何已登入的使用者
pub struct CurrentUser(pub Principal);

/// 具 admin 角色的使用者
pub struct AdminUser(pub Principal);

fn bearer_token(parts: &Parts) -> Result<&str, CizError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(CizError::Unauthorized)?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(CizError::Unauthorized)
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = CizError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let principal = state.auth.authenticate(token).await?;
        Ok(CurrentUser(principal))
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = CizError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentUser(principal) = CurrentUser::from_request_parts(parts, state).await?;
        require_admin(&principal)?;
        Ok(AdminUser(principal))
    }
}

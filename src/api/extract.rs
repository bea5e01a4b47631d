// 解析失敗時同樣回傳 {error, details} 的 extractor

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::utils::error::CizError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(CizError))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(CizError))]
pub struct Path<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(CizError))]
pub struct Query<T>(pub T);

impl From<JsonRejection> for CizError {
    fn from(rejection: JsonRejection) -> Self {
        CizError::validation(format!(
            "リクエスト本文の形式が正しくありません: {}",
            rejection.body_text()
        ))
    }
}

impl From<PathRejection> for CizError {
    fn from(rejection: PathRejection) -> Self {
        CizError::validation(format!(
            "URL の指定が正しくありません: {}",
            rejection.body_text()
        ))
    }
}

impl From<QueryRejection> for CizError {
    fn from(rejection: QueryRejection) -> Self {
        CizError::validation(format!(
            "クエリパラメータが正しくありません: {}",
            rejection.body_text()
        ))
    }
}

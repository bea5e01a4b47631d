// 社員 CRUD 與批次匯入

use axum::{body::Bytes, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::adapters::storage::MemoryStorage;
use crate::api::auth::{AdminUser, CurrentUser};
use crate::api::extract::{Json, Path, Query};
use crate::api::AppState;
use crate::core::engine::ImportEngine;
use crate::core::import::CsvImportPipeline;
use crate::domain::model::{Employee, EmployeePatch, ImportSummary, NewEmployee, RawEmployee};
use crate::utils::error::CizError;

const UPLOAD_FILE_NAME: &str = "upload.csv";

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub employees: Vec<RawEmployee>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ImportCsvQuery {
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    #[serde(flatten)]
    pub summary: ImportSummary,
    /// 正規化後的資料，只有 dry run 時回傳
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<Vec<NewEmployee>>,
}

/// GET /api/employees
pub async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<Vec<Employee>>, CizError> {
    Ok(Json(state.employees.list().await?))
}

/// GET /api/employees/{id}
pub async fn get(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Employee>, CizError> {
    Ok(Json(state.employees.get(id).await?))
}

/// PATCH /api/employees/{id}
pub async fn update(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    Json(patch): Json<EmployeePatch>,
) -> Result<Json<Employee>, CizError> {
    Ok(Json(state.employees.update(id, patch).await?))
}

/// DELETE /api/employees/{id}
pub async fn delete(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, CizError> {
    state.employees.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/employees/import
///
/// 欄位已由前端拆好，驗證規則與 CSV 上傳相同
pub async fn import_json(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(request): Json<ImportRequest>,
) -> Result<Json<ImportResponse>, CizError> {
    tracing::info!(
        "JSON import of {} rows requested by {}",
        request.employees.len(),
        admin.user.id
    );
    let summary = state.employees.import(request.employees).await?;
    Ok(Json(ImportResponse {
        summary,
        preview: None,
    }))
}

/// POST /api/employees/import/csv[?dry_run=true]
///
/// body 為原始檔案，接受 Shift_JIS、UTF-8 (含或不含 BOM)、UTF-16
pub async fn import_csv(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Query(query): Query<ImportCsvQuery>,
    body: Bytes,
) -> Result<Json<ImportResponse>, CizError> {
    tracing::info!(
        "CSV import ({} bytes, dry_run={}) requested by {}",
        body.len(),
        query.dry_run,
        admin.user.id
    );

    let storage = MemoryStorage::with_file(UPLOAD_FILE_NAME, &body);
    let pipeline = CsvImportPipeline::new(
        storage.clone(),
        state.import.clone(),
        state.employees.store(),
        UPLOAD_FILE_NAME,
    )
    .with_dry_run(query.dry_run);

    let summary = ImportEngine::new(pipeline).run().await?;

    let preview = match summary.preview_path.as_deref() {
        Some(path) => {
            let data = storage
                .get_file(path)
                .ok_or_else(|| CizError::not_found(path.to_string()))?;
            Some(serde_json::from_slice(&data)?)
        }
        None => None,
    };

    Ok(Json(ImportResponse { summary, preview }))
}

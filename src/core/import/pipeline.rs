use crate::core::import::{encoding::decode_bytes, reader::parse_table, rows::validate_rows};
use crate::domain::model::{ImportSummary, NewEmployee, RawEmployee};
use crate::domain::ports::{ConfigProvider, EmployeeStore, Pipeline, Storage};
use crate::utils::error::{CizError, Result};
use std::path::Path;
use std::sync::Arc;

/// 依 batch_size 分批送出，任何一批失敗就中止並回報已寫入筆數
pub async fn submit_in_batches<B: EmployeeStore + ?Sized>(
    store: &B,
    employees: &[NewEmployee],
    batch_size: usize,
) -> Result<ImportSummary> {
    let batch_size = batch_size.max(1);
    let mut accepted = 0;
    let mut batches = 0;

    for chunk in employees.chunks(batch_size) {
        tracing::debug!(
            "Submitting batch {} ({} employees)",
            batches + 1,
            chunk.len()
        );
        match store.import_employees(chunk).await {
            Ok(count) => {
                accepted += count;
                batches += 1;
            }
            Err(e) => {
                tracing::error!("❌ Batch {} rejected: {}", batches + 1, e);
                return Err(CizError::SubmissionError {
                    accepted,
                    source: Box::new(e),
                });
            }
        }
    }

    Ok(ImportSummary {
        total_rows: employees.len(),
        submitted: accepted,
        batches,
        dry_run: false,
        preview_path: None,
    })
}

pub struct CsvImportPipeline<S: Storage, C: ConfigProvider, B: EmployeeStore + ?Sized> {
    pub(crate) storage: S,
    pub(crate) config: C,
    pub(crate) store: Arc<B>,
    pub(crate) file_name: String,
    pub(crate) dry_run: bool,
}

impl<S: Storage, C: ConfigProvider, B: EmployeeStore + ?Sized> CsvImportPipeline<S, C, B> {
    pub fn new(storage: S, config: C, store: Arc<B>, file_name: impl Into<String>) -> Self {
        Self {
            storage,
            config,
            store,
            file_name: file_name.into(),
            dry_run: false,
        }
    }

    /// 只驗證並輸出預覽 JSON，不寫入後端
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    fn preview_file_name(&self) -> String {
        let stem = Path::new(&self.file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("import");
        format!("{}.preview.json", stem)
    }
}

#[async_trait::async_trait]
impl<S, C, B> Pipeline for CsvImportPipeline<S, C, B>
where
    S: Storage,
    C: ConfigProvider,
    B: EmployeeStore + ?Sized,
{
    async fn extract(&self) -> Result<Vec<RawEmployee>> {
        tracing::debug!("Reading {}", self.file_name);
        let bytes = self.storage.read_file(&self.file_name).await?;

        let decoded = decode_bytes(&bytes, self.config.fallback_encoding())?;
        tracing::debug!(
            "Decoded {} bytes as {}",
            bytes.len(),
            decoded.encoding
        );

        parse_table(&decoded.text, self.config.max_rows())
    }

    async fn transform(&self, rows: Vec<RawEmployee>) -> Result<Vec<NewEmployee>> {
        validate_rows(&rows)
    }

    async fn load(&self, employees: Vec<NewEmployee>) -> Result<ImportSummary> {
        if self.dry_run {
            let preview_path = self.preview_file_name();
            let json = serde_json::to_string_pretty(&employees)?;
            self.storage.write_file(&preview_path, json.as_bytes()).await?;
            tracing::info!("🔍 Dry run: preview written to {}", preview_path);

            return Ok(ImportSummary {
                total_rows: employees.len(),
                submitted: 0,
                batches: 0,
                dry_run: true,
                preview_path: Some(preview_path),
            });
        }

        submit_in_batches(self.store.as_ref(), &employees, self.config.batch_size()).await
    }
}

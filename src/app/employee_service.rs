use crate::core::import::rows::{is_valid_email, validate_rows};
use crate::core::import::submit_in_batches;
use crate::core::import::text::trim_spaces;
use crate::domain::model::{Employee, EmployeePatch, ImportSummary, RawEmployee};
use crate::domain::ports::EmployeeStore;
use crate::utils::error::{CizError, Result};
use std::sync::Arc;

pub struct EmployeeService<E: EmployeeStore + ?Sized> {
    store: Arc<E>,
    batch_size: usize,
    max_rows: usize,
}

impl<E: EmployeeStore + ?Sized> EmployeeService<E> {
    pub fn new(store: Arc<E>, batch_size: usize, max_rows: usize) -> Self {
        Self {
            store,
            batch_size,
            max_rows,
        }
    }

    pub fn store(&self) -> Arc<E> {
        self.store.clone()
    }

    pub async fn list(&self) -> Result<Vec<Employee>> {
        self.store.list_employees().await
    }

    pub async fn get(&self, id: i64) -> Result<Employee> {
        self.store
            .find_employee(id)
            .await?
            .ok_or_else(|| CizError::not_found(format!("employee {}", id)))
    }

    pub async fn update(&self, id: i64, patch: EmployeePatch) -> Result<Employee> {
        let patch = normalize_patch(patch)?;

        let updated = self
            .store
            .update_employee(id, &patch)
            .await?
            .ok_or_else(|| CizError::not_found(format!("employee {}", id)))?;

        tracing::info!("Employee {} updated", id);
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        if !self.store.delete_employee(id).await? {
            return Err(CizError::not_found(format!("employee {}", id)));
        }
        tracing::info!("Employee {} deleted", id);
        Ok(())
    }

    /// JSON 匯入: 規則與 CSV 相同，行號以 1 起算的陣列索引表示
    pub async fn import(&self, mut rows: Vec<RawEmployee>) -> Result<ImportSummary> {
        if rows.is_empty() {
            return Err(CizError::validation("取り込むデータがありません"));
        }
        if rows.len() > self.max_rows {
            return Err(CizError::validation(format!(
                "取り込める行数は最大 {} 行です",
                self.max_rows
            )));
        }

        for (index, row) in rows.iter_mut().enumerate() {
            row.line = index + 1;
        }

        let employees = validate_rows(&rows)?;
        let summary = submit_in_batches(self.store.as_ref(), &employees, self.batch_size).await?;
        tracing::info!(
            "✅ Imported {} employees via JSON in {} batches",
            summary.submitted,
            summary.batches
        );
        Ok(summary)
    }
}

fn normalize_patch(patch: EmployeePatch) -> Result<EmployeePatch> {
    if patch.is_empty() {
        return Err(CizError::validation("変更する項目がありません"));
    }

    let non_empty = |value: Option<String>, field: &str| -> Result<Option<String>> {
        match value {
            Some(v) => {
                let trimmed = trim_spaces(&v).to_string();
                if trimmed.is_empty() {
                    Err(CizError::validation(format!("{}は空にできません", field)))
                } else {
                    Ok(Some(trimmed))
                }
            }
            None => Ok(None),
        }
    };

    let email = non_empty(patch.email, "メールアドレス")?;
    if let Some(email) = &email {
        if !is_valid_email(email) {
            return Err(CizError::validation(format!(
                "メールアドレスの形式が正しくありません ({})",
                email
            )));
        }
    }

    Ok(EmployeePatch {
        last_name: non_empty(patch.last_name, "姓")?,
        // 名は空でもよい (氏名に区切りがない場合と同じ)
        first_name: patch.first_name.map(|v| trim_spaces(&v).to_string()),
        display_name: non_empty(patch.display_name, "表示名")?,
        email,
        gender: patch.gender,
    })
}

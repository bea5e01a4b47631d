use crate::domain::model::{CizAdjustment, CizBalance, CizTransaction};
use crate::domain::ports::CizStore;
use crate::utils::error::{CizError, Result};
use std::sync::Arc;

pub const DEFAULT_HISTORY_LIMIT: usize = 50;
pub const MAX_HISTORY_LIMIT: usize = 200;

pub struct CizService<C: CizStore + ?Sized> {
    store: Arc<C>,
}

impl<C: CizStore + ?Sized> CizService<C> {
    pub fn new(store: Arc<C>) -> Self {
        Self { store }
    }

    /// 尚未有餘額資料的社員視為 0
    pub async fn balance(&self, employee_id: i64) -> Result<CizBalance> {
        Ok(self
            .store
            .find_balance(employee_id)
            .await?
            .unwrap_or(CizBalance {
                employee_id,
                balance: 0,
            }))
    }

    pub async fn history(
        &self,
        employee_id: i64,
        limit: Option<usize>,
    ) -> Result<Vec<CizTransaction>> {
        let limit = limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT);
        self.store.list_history(employee_id, limit).await
    }

    pub async fn grant(&self, employee_id: i64, amount: i64, reason: &str) -> Result<CizBalance> {
        let reason = checked_reason(reason)?;
        checked_amount(amount)?;

        let balance = self
            .store
            .adjust(&CizAdjustment {
                employee_id,
                delta: amount,
                reason,
                floor: None,
            })
            .await?;
        tracing::info!(
            "Granted {} ciz to employee {} (balance {})",
            amount,
            employee_id,
            balance.balance
        );
        Ok(balance)
    }

    pub async fn deduct(&self, employee_id: i64, amount: i64, reason: &str) -> Result<CizBalance> {
        let reason = checked_reason(reason)?;
        checked_amount(amount)?;

        let current = self.balance(employee_id).await?;
        if current.balance < amount {
            return Err(CizError::InsufficientCiz {
                balance: current.balance,
                requested: amount,
            });
        }

        // 同時扣點時以後端的 floor 檢查為準
        let balance = self
            .store
            .adjust(&CizAdjustment {
                employee_id,
                delta: -amount,
                reason,
                floor: Some(0),
            })
            .await?;
        tracing::info!(
            "Deducted {} ciz from employee {} (balance {})",
            amount,
            employee_id,
            balance.balance
        );
        Ok(balance)
    }
}

fn checked_amount(amount: i64) -> Result<()> {
    if amount <= 0 {
        return Err(CizError::validation("ciz数は1以上で指定してください"));
    }
    Ok(())
}

fn checked_reason(reason: &str) -> Result<String> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(CizError::validation("理由を入力してください"));
    }
    Ok(reason.to_string())
}

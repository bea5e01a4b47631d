use crate::app::ciz_service::CizService;
use crate::domain::model::{Event, NewEvent, Participation};
use crate::domain::ports::{CizStore, EventStore};
use crate::utils::error::{CizError, Result};
use std::sync::Arc;

pub struct EventService<V: EventStore + ?Sized, C: CizStore + ?Sized> {
    store: Arc<V>,
    ciz: Arc<CizService<C>>,
}

impl<V: EventStore + ?Sized, C: CizStore + ?Sized> EventService<V, C> {
    pub fn new(store: Arc<V>, ciz: Arc<CizService<C>>) -> Self {
        Self { store, ciz }
    }

    pub async fn list(&self) -> Result<Vec<Event>> {
        self.store.list_events().await
    }

    pub async fn create(&self, event: NewEvent) -> Result<Event> {
        let title = event.title.trim().to_string();
        if title.is_empty() {
            return Err(CizError::validation("タイトルを入力してください"));
        }
        if event.starts_at >= event.ends_at {
            return Err(CizError::validation(
                "終了日時は開始日時より後にしてください",
            ));
        }
        if event.reward_ciz < 0 {
            return Err(CizError::validation("付与cizは0以上で指定してください"));
        }

        let created = self
            .store
            .create_event(&NewEvent { title, ..event })
            .await?;
        tracing::info!("Event {} created: {}", created.id, created.title);
        Ok(created)
    }

    async fn event(&self, event_id: i64) -> Result<Event> {
        self.store
            .find_event(event_id)
            .await?
            .ok_or_else(|| CizError::not_found(format!("event {}", event_id)))
    }

    pub async fn participants(&self, event_id: i64) -> Result<Vec<Participation>> {
        self.event(event_id).await?;
        self.store.list_participants(event_id).await
    }

    pub async fn join(&self, event_id: i64, employee_id: i64) -> Result<Participation> {
        self.event(event_id).await?;

        if self
            .store
            .find_participation(event_id, employee_id)
            .await?
            .is_some()
        {
            return Err(CizError::Conflict {
                message: "既に参加登録されています".to_string(),
            });
        }

        self.store.add_participant(event_id, employee_id).await
    }

    /// 出席由 false 變成 true 時才發放獎勵，取消出席不回收
    ///
    /// 發放失敗時把出席改回原值，重試時會再次發放
    pub async fn mark_attendance(
        &self,
        event_id: i64,
        employee_id: i64,
        attended: bool,
    ) -> Result<Participation> {
        let event = self.event(event_id).await?;
        let current = self
            .store
            .find_participation(event_id, employee_id)
            .await?
            .ok_or_else(|| {
                CizError::not_found(format!(
                    "participant {} of event {}",
                    employee_id, event_id
                ))
            })?;

        let updated = self
            .store
            .set_attendance(event_id, employee_id, attended)
            .await?;

        if attended && !current.attended && event.reward_ciz > 0 {
            let granted = self
                .ciz
                .grant(
                    employee_id,
                    event.reward_ciz,
                    &format!("イベント参加: {}", event.title),
                )
                .await;

            if let Err(e) = granted {
                tracing::error!(
                    "❌ Reward for event {} failed, reverting attendance of employee {}: {}",
                    event_id,
                    employee_id,
                    e
                );
                if let Err(revert) = self
                    .store
                    .set_attendance(event_id, employee_id, current.attended)
                    .await
                {
                    tracing::error!("❌ Could not revert attendance: {}", revert);
                }
                return Err(e);
            }
        }

        Ok(updated)
    }
}

// src/services/ledger_service.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        bookkeeping::{ledger_deletion_effects, ledger_opening_effects, ledger_settlement_effects, round_money},
        error::AppError,
    },
    db::LedgerRepository,
    models::ledger::{LedgerEntry, LedgerKind, LedgerStatus, LedgerSummary},
    services::posting::Posting,
};

// Informal loans. Opening and settling both go through the cash box.
#[derive(Clone)]
pub struct LedgerService {
    ledger_repo: LedgerRepository,
    posting: Posting,
    pool: PgPool,
}

impl LedgerService {
    pub fn new(ledger_repo: LedgerRepository, posting: Posting, pool: PgPool) -> Self {
        Self { ledger_repo, posting, pool }
    }

    pub async fn list_entries(&self, status: Option<LedgerStatus>) -> Result<Vec<LedgerEntry>, AppError> {
        self.ledger_repo.list(status).await
    }

    pub async fn summary(&self) -> Result<LedgerSummary, AppError> {
        self.ledger_repo.summary().await
    }

    pub async fn create_entry(
        &self,
        person_name: &str,
        phone: Option<&str>,
        kind: LedgerKind,
        amount: Decimal,
        entry_date: NaiveDate,
        due_date: Option<NaiveDate>,
        notes: Option<&str>,
    ) -> Result<LedgerEntry, AppError> {
        let mut tx = self.pool.begin().await?;

        let entry = self
            .ledger_repo
            .create(&mut *tx, person_name.trim(), phone, kind, round_money(amount), entry_date, due_date, notes)
            .await?;
        self.posting
            .apply(&mut tx, &ledger_opening_effects(entry.kind, entry.amount), Some(entry.id), None)
            .await?;

        tx.commit().await?;
        Ok(entry)
    }

    pub async fn settle_entry(&self, id: Uuid, settled_on: NaiveDate) -> Result<LedgerEntry, AppError> {
        let mut tx = self.pool.begin().await?;

        let entry = self
            .ledger_repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("ledger_entry"))?;

        if entry.status != LedgerStatus::Open {
            return Err(AppError::InvalidStateTransition {
                from: entry.status.as_str().to_string(),
                to: LedgerStatus::Settled.as_str().to_string(),
            });
        }

        let settled = self.ledger_repo.mark_settled(&mut *tx, id, settled_on).await?;
        self.posting
            .apply(&mut tx, &ledger_settlement_effects(settled.kind, settled.amount), Some(settled.id), None)
            .await?;

        tx.commit().await?;
        Ok(settled)
    }

    pub async fn delete_entry(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let entry = self
            .ledger_repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("ledger_entry"))?;

        self.ledger_repo.delete(&mut *tx, id).await?;

        self.posting
            .apply(
                &mut tx,
                &ledger_deletion_effects(entry.kind, entry.status, entry.amount),
                Some(entry.id),
                None,
            )
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

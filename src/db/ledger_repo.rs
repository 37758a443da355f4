// src/db/ledger_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::ledger::{LedgerEntry, LedgerKind, LedgerStatus, LedgerSummary},
};

#[derive(Clone)]
pub struct LedgerRepository {
    pool: PgPool,
}

impl LedgerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, status: Option<LedgerStatus>) -> Result<Vec<LedgerEntry>, AppError> {
        let entries = sqlx::query_as::<_, LedgerEntry>(
            r#"
            SELECT * FROM ledger_entries
            WHERE ($1::ledger_status IS NULL OR status = $1)
            ORDER BY entry_date DESC, created_at DESC
            "#,
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    pub async fn summary(&self) -> Result<LedgerSummary, AppError> {
        let summary = sqlx::query_as::<_, LedgerSummary>(
            r#"
            SELECT
                COALESCE(SUM(amount) FILTER (WHERE kind = 'GIVEN'), 0) AS outstanding_given,
                COALESCE(SUM(amount) FILTER (WHERE kind = 'TAKEN'), 0) AS outstanding_taken,
                COUNT(*) AS open_entries
            FROM ledger_entries
            WHERE status = 'OPEN'
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(summary)
    }

    pub async fn find_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<LedgerEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entry = sqlx::query_as::<_, LedgerEntry>(
            "SELECT * FROM ledger_entries WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(entry)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        person_name: &str,
        phone: Option<&str>,
        kind: LedgerKind,
        amount: Decimal,
        entry_date: NaiveDate,
        due_date: Option<NaiveDate>,
        notes: Option<&str>,
    ) -> Result<LedgerEntry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entry = sqlx::query_as::<_, LedgerEntry>(
            r#"
            INSERT INTO ledger_entries (person_name, phone, kind, amount, entry_date, due_date, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(person_name)
        .bind(phone)
        .bind(kind)
        .bind(amount)
        .bind(entry_date)
        .bind(due_date)
        .bind(notes)
        .fetch_one(executor)
        .await?;
        Ok(entry)
    }

    pub async fn mark_settled<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        settled_on: NaiveDate,
    ) -> Result<LedgerEntry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, LedgerEntry>(
            r#"
            UPDATE ledger_entries
            SET status = 'SETTLED', settled_on = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(settled_on)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("ledger_entry"))
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM ledger_entries WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("ledger_entry"));
        }
        Ok(())
    }
}

// src/db/dashboard_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, PgPool, Postgres};

use crate::{common::error::AppError, models::dashboard::DashboardSummary};

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// All cards from one snapshot. Month-to-date totals cover `month_start..=today`;
    /// entries dated in the future are left out.
    pub async fn get_summary<'e, E>(
        &self,
        executor: E,
        month_start: NaiveDate,
        today: NaiveDate,
    ) -> Result<DashboardSummary, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        // A. Balances
        let (bank_balance, cash_balance): (Decimal, Decimal) =
            sqlx::query_as("SELECT bank_balance, cash_balance FROM balances WHERE id = 1")
                .fetch_one(&mut *tx)
                .await?;

        // B. Stock
        let (inventory_value, low_stock_items): (Decimal, i64) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(ROUND(quantity * average_price, 2)), 0),
                   COUNT(*) FILTER (WHERE low_stock_threshold > 0 AND quantity <= low_stock_threshold)
            FROM inventory_items
            "#,
        )
        .fetch_one(&mut *tx)
        .await?;

        // C. Month to date
        let (purchases_this_month, sales_this_month): (Decimal, Decimal) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(total_amount) FILTER (WHERE direction = 'INWARD'), 0),
                   COALESCE(SUM(total_amount) FILTER (WHERE direction = 'OUTWARD'), 0)
            FROM goods_entries
            WHERE entry_date BETWEEN $1 AND $2
            "#,
        )
        .bind(month_start)
        .bind(today)
        .fetch_one(&mut *tx)
        .await?;

        let expenses_this_month: Decimal = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount), 0) FROM expenses WHERE expense_date BETWEEN $1 AND $2",
        )
        .bind(month_start)
        .bind(today)
        .fetch_one(&mut *tx)
        .await?;

        // D. Open loans
        let (loans_given_outstanding, loans_taken_outstanding): (Decimal, Decimal) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(amount) FILTER (WHERE kind = 'GIVEN'), 0),
                   COALESCE(SUM(amount) FILTER (WHERE kind = 'TAKEN'), 0)
            FROM ledger_entries
            WHERE status = 'OPEN'
            "#,
        )
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(DashboardSummary {
            bank_balance,
            cash_balance,
            inventory_value,
            purchases_this_month,
            sales_this_month,
            expenses_this_month,
            loans_given_outstanding,
            loans_taken_outstanding,
            low_stock_items,
        })
    }
}

// src/db/expense_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{balances::BalanceAccount, expenses::Expense},
};

#[derive(Clone)]
pub struct ExpenseRepository {
    pool: PgPool,
}

impl ExpenseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Expense>, AppError> {
        let expenses = sqlx::query_as::<_, Expense>(
            r#"
            SELECT * FROM expenses
            WHERE ($1::date IS NULL OR expense_date >= $1)
              AND ($2::date IS NULL OR expense_date <= $2)
            ORDER BY expense_date DESC, created_at DESC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(expenses)
    }

    pub async fn find_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Expense>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let expense = sqlx::query_as::<_, Expense>("SELECT * FROM expenses WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(expense)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        expense_date: NaiveDate,
        category: &str,
        description: Option<&str>,
        amount: Decimal,
        paid_from: BalanceAccount,
    ) -> Result<Expense, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let expense = sqlx::query_as::<_, Expense>(
            r#"
            INSERT INTO expenses (expense_date, category, description, amount, paid_from)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(expense_date)
        .bind(category)
        .bind(description)
        .bind(amount)
        .bind(paid_from)
        .fetch_one(executor)
        .await?;
        Ok(expense)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        expense_date: NaiveDate,
        category: &str,
        description: Option<&str>,
        amount: Decimal,
        paid_from: BalanceAccount,
    ) -> Result<Expense, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Expense>(
            r#"
            UPDATE expenses
            SET expense_date = $2, category = $3, description = $4, amount = $5,
                paid_from = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(expense_date)
        .bind(category)
        .bind(description)
        .bind(amount)
        .bind(paid_from)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("expense"))
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM expenses WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("expense"));
        }
        Ok(())
    }
}

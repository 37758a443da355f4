// src/services/expense_service.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        bookkeeping::{expense_effects, round_money},
        error::AppError,
    },
    db::ExpenseRepository,
    models::{balances::BalanceAccount, expenses::Expense},
    services::posting::Posting,
};

#[derive(Clone)]
pub struct ExpenseService {
    expense_repo: ExpenseRepository,
    posting: Posting,
    pool: PgPool,
}

impl ExpenseService {
    pub fn new(expense_repo: ExpenseRepository, posting: Posting, pool: PgPool) -> Self {
        Self { expense_repo, posting, pool }
    }

    pub async fn list_expenses(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Expense>, AppError> {
        self.expense_repo.list(from, to).await
    }

    pub async fn create_expense(
        &self,
        expense_date: NaiveDate,
        category: &str,
        description: Option<&str>,
        amount: Decimal,
        paid_from: BalanceAccount,
    ) -> Result<Expense, AppError> {
        let mut tx = self.pool.begin().await?;

        let expense = self
            .expense_repo
            .create(&mut *tx, expense_date, category.trim(), description, round_money(amount), paid_from)
            .await?;
        self.posting
            .apply(&mut tx, &expense_effects(expense.paid_from, expense.amount), Some(expense.id), None)
            .await?;

        tx.commit().await?;
        Ok(expense)
    }

    pub async fn update_expense(
        &self,
        id: Uuid,
        expense_date: NaiveDate,
        category: &str,
        description: Option<&str>,
        amount: Decimal,
        paid_from: BalanceAccount,
    ) -> Result<Expense, AppError> {
        let mut tx = self.pool.begin().await?;

        let old = self
            .expense_repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("expense"))?;

        let expense = self
            .expense_repo
            .update(&mut *tx, id, expense_date, category.trim(), description, round_money(amount), paid_from)
            .await?;

        let effects = expense_effects(old.paid_from, old.amount)
            .reversed()
            .then(expense_effects(expense.paid_from, expense.amount));
        self.posting.apply(&mut tx, &effects, Some(expense.id), None).await?;

        tx.commit().await?;
        Ok(expense)
    }

    pub async fn delete_expense(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let old = self
            .expense_repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("expense"))?;

        self.expense_repo.delete(&mut *tx, id).await?;
        self.posting
            .apply(&mut tx, &expense_effects(old.paid_from, old.amount).reversed(), Some(old.id), None)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

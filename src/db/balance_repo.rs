// src/db/balance_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::balances::{BalanceAccount, Balances},
};

#[derive(Clone)]
pub struct BalanceRepository {
    pool: PgPool,
}

impl BalanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self) -> Result<Balances, AppError> {
        let balances = sqlx::query_as::<_, Balances>(
            "SELECT bank_balance, cash_balance, updated_at FROM balances WHERE id = 1",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(balances)
    }

    pub async fn set<'e, E>(
        &self,
        executor: E,
        bank_balance: Decimal,
        cash_balance: Decimal,
    ) -> Result<Balances, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let balances = sqlx::query_as::<_, Balances>(
            r#"
            UPDATE balances
            SET bank_balance = $1, cash_balance = $2, updated_at = NOW()
            WHERE id = 1
            RETURNING bank_balance, cash_balance, updated_at
            "#,
        )
        .bind(bank_balance)
        .bind(cash_balance)
        .fetch_one(executor)
        .await?;
        Ok(balances)
    }

    /// Adds a signed amount to one account. Runs as a single UPDATE so
    /// concurrent adjustments never lose each other.
    pub async fn adjust<'e, E>(
        &self,
        executor: E,
        account: BalanceAccount,
        delta: Decimal,
    ) -> Result<Balances, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = match account {
            BalanceAccount::Bank => {
                r#"
                UPDATE balances SET bank_balance = bank_balance + $1, updated_at = NOW()
                WHERE id = 1
                RETURNING bank_balance, cash_balance, updated_at
                "#
            }
            BalanceAccount::Cash => {
                r#"
                UPDATE balances SET cash_balance = cash_balance + $1, updated_at = NOW()
                WHERE id = 1
                RETURNING bank_balance, cash_balance, updated_at
                "#
            }
        };

        let balances = sqlx::query_as::<_, Balances>(sql)
            .bind(delta)
            .fetch_one(executor)
            .await?;
        Ok(balances)
    }
}

// src/services/balance_service.rs

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{common::error::AppError, db::BalanceRepository, models::balances::Balances};

#[derive(Clone)]
pub struct BalanceService {
    balance_repo: BalanceRepository,
    pool: PgPool,
}

impl BalanceService {
    pub fn new(balance_repo: BalanceRepository, pool: PgPool) -> Self {
        Self { balance_repo, pool }
    }

    pub async fn get_balances(&self) -> Result<Balances, AppError> {
        self.balance_repo.get().await
    }

    /// Overwrites both balances, e.g. when the books are opened or recounted.
    pub async fn set_opening_balances(
        &self,
        bank_balance: Decimal,
        cash_balance: Decimal,
    ) -> Result<Balances, AppError> {
        let balances = self
            .balance_repo
            .set(&self.pool, bank_balance.round_dp(2), cash_balance.round_dp(2))
            .await?;
        tracing::info!(%bank_balance, %cash_balance, "Opening balances set");
        Ok(balances)
    }
}

// src/services/posting.rs
//
// Executes bookkeeping `Effects` against the database. Callers own the
// transaction; nothing here commits.

use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    common::{
        bookkeeping::{apply_stock, stock_by_item, Effects, StockState},
        error::AppError,
    },
    db::{BalanceRepository, InventoryRepository},
};

#[derive(Clone)]
pub struct Posting {
    inventory_repo: InventoryRepository,
    balance_repo: BalanceRepository,
}

impl Posting {
    pub fn new(inventory_repo: InventoryRepository, balance_repo: BalanceRepository) -> Self {
        Self { inventory_repo, balance_repo }
    }

    pub async fn apply(
        &self,
        conn: &mut PgConnection,
        effects: &Effects,
        reference_id: Option<Uuid>,
        notes: Option<&str>,
    ) -> Result<(), AppError> {
        // Each item is judged on the net result of all its moves.
        let by_item = stock_by_item(&effects.stock);

        for (item_id, item_effects) in &by_item {
            let item = self
                .inventory_repo
                .get_for_update(&mut *conn, *item_id)
                .await?
                .ok_or(AppError::NotFound("item"))?;

            let moves: Vec<_> = item_effects.iter().map(|e| (e.quantity, e.unit_price)).collect();
            let current = StockState { quantity: item.quantity, average_price: item.average_price };
            let next = apply_stock(current, &moves).map_err(|shortfall| AppError::InsufficientStock {
                item: item.name.clone(),
                available: shortfall.available,
                requested: shortfall.requested,
            })?;

            self.inventory_repo
                .set_stock(&mut *conn, item.id, next.quantity, next.average_price)
                .await?;

            for effect in item_effects {
                self.inventory_repo
                    .record_stock_movement(
                        &mut *conn,
                        item.id,
                        effect.quantity,
                        effect.reason,
                        effect.unit_price,
                        reference_id,
                        notes,
                    )
                    .await?;
            }
        }

        for effect in &effects.balance {
            if effect.amount.is_zero() {
                continue;
            }
            self.balance_repo
                .adjust(&mut *conn, effect.account, effect.amount)
                .await?;
        }

        tracing::debug!(
            stock_effects = effects.stock.len(),
            balance_effects = effects.balance.len(),
            ?reference_id,
            "Effects posted"
        );
        Ok(())
    }
}

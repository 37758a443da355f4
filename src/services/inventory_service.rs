// src/services/inventory_service.rs

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::{
        bookkeeping::{round_money, round_quantity, Effects, StockEffect},
        error::AppError,
    },
    db::{inventory_repo::ItemFields, InventoryRepository},
    models::inventory::{InventoryItem, StockMovement, StockMovementReason},
    services::posting::Posting,
};

/// What an upsert by name did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upserted {
    Created,
    Updated,
}

#[derive(Clone)]
pub struct InventoryService {
    inventory_repo: InventoryRepository,
    posting: Posting,
    pool: PgPool,
}

impl InventoryService {
    pub fn new(inventory_repo: InventoryRepository, posting: Posting, pool: PgPool) -> Self {
        Self { inventory_repo, posting, pool }
    }

    // --- CREATE ITEM ---
    pub async fn create_item(
        &self,
        fields: &ItemFields<'_>,
        opening_stock: Decimal,
        opening_price: Decimal,
    ) -> Result<InventoryItem, AppError> {
        let mut tx = self.pool.begin().await?;
        let item = self
            .create_with_opening_stock(&mut tx, fields, opening_stock, opening_price)
            .await?;
        tx.commit().await?;
        Ok(item)
    }

    async fn create_with_opening_stock(
        &self,
        conn: &mut PgConnection,
        fields: &ItemFields<'_>,
        opening_stock: Decimal,
        opening_price: Decimal,
    ) -> Result<InventoryItem, AppError> {
        let quantity = round_quantity(opening_stock);
        let average_price = if quantity.is_zero() { Decimal::ZERO } else { round_money(opening_price) };

        let item = self
            .inventory_repo
            .create_item(&mut *conn, fields, quantity, average_price)
            .await?;

        if quantity > Decimal::ZERO {
            self.inventory_repo
                .record_stock_movement(
                    &mut *conn,
                    item.id,
                    quantity,
                    StockMovementReason::InitialStock,
                    Some(average_price),
                    None,
                    Some("Opening stock"),
                )
                .await?;
        }
        Ok(item)
    }

    pub async fn list_items(&self) -> Result<Vec<InventoryItem>, AppError> {
        self.inventory_repo.get_all_items().await
    }

    pub async fn get_item(&self, id: Uuid) -> Result<InventoryItem, AppError> {
        self.inventory_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("item"))
    }

    /// Descriptive fields only; quantity and average price belong to the ledgers.
    pub async fn update_item(&self, id: Uuid, fields: &ItemFields<'_>) -> Result<InventoryItem, AppError> {
        self.inventory_repo.update_item(&self.pool, id, fields).await
    }

    pub async fn delete_item(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let item = self
            .inventory_repo
            .get_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("item"))?;

        if self.inventory_repo.count_goods_references(&mut *tx, id).await? > 0 {
            return Err(AppError::ItemInUse(item.name));
        }

        self.inventory_repo.delete_item(&mut *tx, id).await?;
        tx.commit().await?;

        tracing::info!(item = %item.name, "Inventory item deleted");
        Ok(())
    }

    // --- MANUAL CORRECTION ---
    pub async fn adjust_stock(
        &self,
        id: Uuid,
        quantity: Decimal,
        unit_price: Option<Decimal>,
        notes: Option<&str>,
    ) -> Result<InventoryItem, AppError> {
        let effects = Effects {
            stock: vec![StockEffect {
                item_id: id,
                quantity: round_quantity(quantity),
                // A price only matters when stock comes in.
                unit_price: unit_price.filter(|_| quantity > Decimal::ZERO),
                reason: StockMovementReason::Correction,
            }],
            balance: vec![],
        };

        let mut tx = self.pool.begin().await?;
        self.posting.apply(&mut tx, &effects, None, notes).await?;
        let item = self
            .inventory_repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("item"))?;
        tx.commit().await?;
        Ok(item)
    }

    pub async fn list_movements(&self, id: Uuid) -> Result<Vec<StockMovement>, AppError> {
        // 404 for unknown items instead of an empty history
        self.get_item(id).await?;
        self.inventory_repo.list_movements(id).await
    }

    pub async fn low_stock(&self) -> Result<Vec<InventoryItem>, AppError> {
        self.inventory_repo.get_low_stock_items().await
    }

    // --- IMPORT ---
    /// New names get an item with opening stock; known names (case-insensitive)
    /// get their descriptive fields refreshed and keep their quantity.
    pub async fn upsert_by_name(
        &self,
        conn: &mut PgConnection,
        fields: &ItemFields<'_>,
        opening_stock: Decimal,
        opening_price: Decimal,
    ) -> Result<Upserted, AppError> {
        match self.inventory_repo.find_by_name(&mut *conn, fields.name).await? {
            Some(existing) => {
                let fields = ItemFields { name: &existing.name, ..fields.clone() };
                self.inventory_repo.update_item(&mut *conn, existing.id, &fields).await?;
                Ok(Upserted::Updated)
            }
            None => {
                self.create_with_opening_stock(conn, fields, opening_stock, opening_price)
                    .await?;
                Ok(Upserted::Created)
            }
        }
    }
}

// src/db/inventory_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::inventory::{InventoryItem, StockMovement, StockMovementReason},
};

/// Descriptive fields of an item. Quantity and average price are never set through this.
#[derive(Debug, Clone)]
pub struct ItemFields<'a> {
    pub name: &'a str,
    pub category: Option<&'a str>,
    pub hsn_code: Option<&'a str>,
    pub unit: &'a str,
    pub low_stock_threshold: Decimal,
}

#[derive(Clone)]
pub struct InventoryRepository {
    pool: PgPool,
}

impl InventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Reads
    // ---

    pub async fn get_all_items(&self) -> Result<Vec<InventoryItem>, AppError> {
        let items = sqlx::query_as::<_, InventoryItem>(
            "SELECT * FROM inventory_items ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn get_low_stock_items(&self) -> Result<Vec<InventoryItem>, AppError> {
        let items = sqlx::query_as::<_, InventoryItem>(
            r#"
            SELECT * FROM inventory_items
            WHERE low_stock_threshold > 0 AND quantity <= low_stock_threshold
            ORDER BY (quantity / low_stock_threshold) ASC, name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<InventoryItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, InventoryItem>("SELECT * FROM inventory_items WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(item)
    }

    pub async fn find_by_name<'e, E>(
        &self,
        executor: E,
        name: &str,
    ) -> Result<Option<InventoryItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, InventoryItem>(
            "SELECT * FROM inventory_items WHERE lower(name) = lower($1)",
        )
        .bind(name)
        .fetch_optional(executor)
        .await?;
        Ok(item)
    }

    /// Locks the row until the surrounding transaction ends.
    pub async fn get_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<InventoryItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, InventoryItem>(
            "SELECT * FROM inventory_items WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(item)
    }

    pub async fn count_goods_references<'e, E>(&self, executor: E, id: Uuid) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM goods_entries WHERE item_id = $1")
            .bind(id)
            .fetch_one(executor)
            .await?;
        Ok(count)
    }

    pub async fn list_movements(&self, item_id: Uuid) -> Result<Vec<StockMovement>, AppError> {
        let movements = sqlx::query_as::<_, StockMovement>(
            "SELECT * FROM stock_movements WHERE item_id = $1 ORDER BY created_at DESC",
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(movements)
    }

    // ---
    // Writes
    // ---

    pub async fn create_item<'e, E>(
        &self,
        executor: E,
        fields: &ItemFields<'_>,
        quantity: Decimal,
        average_price: Decimal,
    ) -> Result<InventoryItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, InventoryItem>(
            r#"
            INSERT INTO inventory_items (name, category, hsn_code, unit, low_stock_threshold, quantity, average_price)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(fields.name)
        .bind(fields.category)
        .bind(fields.hsn_code)
        .bind(fields.unit)
        .bind(fields.low_stock_threshold)
        .bind(quantity)
        .bind(average_price)
        .fetch_one(executor)
        .await
        .map_err(|e| unique_name_violation(e, fields.name))
    }

    pub async fn update_item<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        fields: &ItemFields<'_>,
    ) -> Result<InventoryItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, InventoryItem>(
            r#"
            UPDATE inventory_items
            SET name = $2, category = $3, hsn_code = $4, unit = $5,
                low_stock_threshold = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(fields.name)
        .bind(fields.category)
        .bind(fields.hsn_code)
        .bind(fields.unit)
        .bind(fields.low_stock_threshold)
        .fetch_optional(executor)
        .await
        .map_err(|e| unique_name_violation(e, fields.name))?
        .ok_or(AppError::NotFound("item"))
    }

    pub async fn set_stock<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        quantity: Decimal,
        average_price: Decimal,
    ) -> Result<InventoryItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, InventoryItem>(
            r#"
            UPDATE inventory_items
            SET quantity = $2, average_price = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(quantity)
        .bind(average_price)
        .fetch_one(executor)
        .await?;
        Ok(item)
    }

    pub async fn delete_item<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM inventory_items WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("item"));
        }
        Ok(())
    }

    /// Appends to the stock history.
    pub async fn record_stock_movement<'e, E>(
        &self,
        executor: E,
        item_id: Uuid,
        quantity_changed: Decimal,
        reason: StockMovementReason,
        unit_price: Option<Decimal>,
        reference_id: Option<Uuid>,
        notes: Option<&str>,
    ) -> Result<StockMovement, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movement = sqlx::query_as::<_, StockMovement>(
            r#"
            INSERT INTO stock_movements (item_id, quantity_changed, reason, unit_price, reference_id, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(item_id)
        .bind(quantity_changed)
        .bind(reason)
        .bind(unit_price)
        .bind(reference_id)
        .bind(notes)
        .fetch_one(executor)
        .await?;
        Ok(movement)
    }
}

fn unique_name_violation(e: sqlx::Error, name: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::ItemNameAlreadyExists(name.to_string());
        }
    }
    e.into()
}

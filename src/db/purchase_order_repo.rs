// src/db/purchase_order_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::purchase_orders::{PurchaseOrder, PurchaseOrderItem, PurchaseOrderStatus},
};

#[derive(Clone)]
pub struct PurchaseOrderRepository {
    pool: PgPool,
}

impl PurchaseOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<PurchaseOrder>, AppError> {
        let orders = sqlx::query_as::<_, PurchaseOrder>(
            "SELECT * FROM purchase_orders ORDER BY order_date DESC, display_id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(orders)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<PurchaseOrder>, AppError> {
        let order = sqlx::query_as::<_, PurchaseOrder>("SELECT * FROM purchase_orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(order)
    }

    pub async fn find_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<PurchaseOrder>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, PurchaseOrder>(
            "SELECT * FROM purchase_orders WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(order)
    }

    pub async fn list_items(&self, order_id: Uuid) -> Result<Vec<PurchaseOrderItem>, AppError> {
        let items = sqlx::query_as::<_, PurchaseOrderItem>(
            "SELECT * FROM purchase_order_items WHERE purchase_order_id = $1 ORDER BY material_name ASC",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn create_order<'e, E>(
        &self,
        executor: E,
        supplier_name: &str,
        order_date: NaiveDate,
        expected_date: Option<NaiveDate>,
        notes: Option<&str>,
        total_amount: Decimal,
    ) -> Result<PurchaseOrder, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, PurchaseOrder>(
            r#"
            INSERT INTO purchase_orders (supplier_name, order_date, expected_date, notes, total_amount)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(supplier_name)
        .bind(order_date)
        .bind(expected_date)
        .bind(notes)
        .bind(total_amount)
        .fetch_one(executor)
        .await?;
        Ok(order)
    }

    pub async fn add_item<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        material_name: &str,
        item_id: Option<Uuid>,
        quantity: Decimal,
        rate: Decimal,
        amount: Decimal,
    ) -> Result<PurchaseOrderItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, PurchaseOrderItem>(
            r#"
            INSERT INTO purchase_order_items (purchase_order_id, material_name, item_id, quantity, rate, amount)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(material_name)
        .bind(item_id)
        .bind(quantity)
        .bind(rate)
        .bind(amount)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_foreign_key_violation() {
                    return AppError::NotFound("item");
                }
            }
            e.into()
        })?;
        Ok(item)
    }

    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: PurchaseOrderStatus,
    ) -> Result<PurchaseOrder, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, PurchaseOrder>(
            "UPDATE purchase_orders SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("purchase_order"))
    }

    /// Lines go with the order through `ON DELETE CASCADE`.
    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM purchase_orders WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("purchase_order"));
        }
        Ok(())
    }
}

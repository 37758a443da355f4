// src/db/goods_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{bookkeeping::TaxBreakdown, error::AppError},
    models::goods::{GoodsDirection, GoodsEntry, GoodsFilter, GoodsVariant},
};

/// A goods entry as it is written: the user's input plus the computed tax split.
#[derive(Debug, Clone)]
pub struct GoodsRecord<'a> {
    pub direction: GoodsDirection,
    pub variant: GoodsVariant,
    pub entry_date: NaiveDate,
    pub invoice_number: Option<&'a str>,
    pub party_name: &'a str,
    pub party_gstin: Option<&'a str>,
    pub item_id: Uuid,
    pub hsn_code: Option<&'a str>,
    pub quantity: Decimal,
    pub rate: Decimal,
    pub gst_rate: Decimal,
    pub tax: TaxBreakdown,
    pub notes: Option<&'a str>,
}

/// Last recorded rates of an item, used as pricing context.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecentRate {
    pub direction: GoodsDirection,
    pub entry_date: NaiveDate,
    pub rate: Decimal,
    pub quantity: Decimal,
}

/// Outward quantity of one calendar month, `YYYY-MM`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MonthlyQuantity {
    pub period: String,
    pub quantity: Decimal,
}

const SELECT_WITH_ITEM: &str = r#"
    SELECT g.*, i.name AS item_name
    FROM goods_entries g
    JOIN inventory_items i ON i.id = g.item_id
"#;

#[derive(Clone)]
pub struct GoodsRepository {
    pool: PgPool,
}

impl GoodsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &GoodsFilter) -> Result<Vec<GoodsEntry>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(SELECT_WITH_ITEM);
        qb.push(" WHERE TRUE");

        if let Some(direction) = filter.direction {
            qb.push(" AND g.direction = ").push_bind(direction);
        }
        if let Some(variant) = filter.variant {
            qb.push(" AND g.variant = ").push_bind(variant);
        }
        if let Some(item_id) = filter.item_id {
            qb.push(" AND g.item_id = ").push_bind(item_id);
        }
        if let Some(from) = filter.from {
            qb.push(" AND g.entry_date >= ").push_bind(from);
        }
        if let Some(to) = filter.to {
            qb.push(" AND g.entry_date <= ").push_bind(to);
        }
        qb.push(" ORDER BY g.entry_date DESC, g.created_at DESC");

        let entries = qb
            .build_query_as::<GoodsEntry>()
            .fetch_all(&self.pool)
            .await?;
        Ok(entries)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<GoodsEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("{SELECT_WITH_ITEM} WHERE g.id = $1");
        let entry = sqlx::query_as::<_, GoodsEntry>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(entry)
    }

    /// Same as `find_by_id`, but locks the entry row for the rest of the transaction.
    pub async fn find_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<GoodsEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("{SELECT_WITH_ITEM} WHERE g.id = $1 FOR UPDATE OF g");
        let entry = sqlx::query_as::<_, GoodsEntry>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(entry)
    }

    pub async fn create<'e, E>(&self, executor: E, record: &GoodsRecord<'_>) -> Result<GoodsEntry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entry = sqlx::query_as::<_, GoodsEntry>(
            r#"
            WITH inserted AS (
                INSERT INTO goods_entries (
                    direction, variant, entry_date, invoice_number, party_name, party_gstin,
                    item_id, hsn_code, quantity, rate, taxable_amount, gst_rate,
                    cgst, sgst, igst, total_amount, notes
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
                RETURNING *
            )
            SELECT g.*, i.name AS item_name
            FROM inserted g
            JOIN inventory_items i ON i.id = g.item_id
            "#,
        )
        .bind(record.direction)
        .bind(record.variant)
        .bind(record.entry_date)
        .bind(record.invoice_number)
        .bind(record.party_name)
        .bind(record.party_gstin)
        .bind(record.item_id)
        .bind(record.hsn_code)
        .bind(record.quantity)
        .bind(record.rate)
        .bind(record.tax.taxable_amount)
        .bind(record.gst_rate)
        .bind(record.tax.cgst)
        .bind(record.tax.sgst)
        .bind(record.tax.igst)
        .bind(record.tax.total_amount)
        .bind(record.notes)
        .fetch_one(executor)
        .await?;
        Ok(entry)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        record: &GoodsRecord<'_>,
    ) -> Result<GoodsEntry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, GoodsEntry>(
            r#"
            WITH updated AS (
                UPDATE goods_entries
                SET direction = $2, variant = $3, entry_date = $4, invoice_number = $5,
                    party_name = $6, party_gstin = $7, item_id = $8, hsn_code = $9,
                    quantity = $10, rate = $11, taxable_amount = $12, gst_rate = $13,
                    cgst = $14, sgst = $15, igst = $16, total_amount = $17, notes = $18,
                    updated_at = NOW()
                WHERE id = $1
                RETURNING *
            )
            SELECT g.*, i.name AS item_name
            FROM updated g
            JOIN inventory_items i ON i.id = g.item_id
            "#,
        )
        .bind(id)
        .bind(record.direction)
        .bind(record.variant)
        .bind(record.entry_date)
        .bind(record.invoice_number)
        .bind(record.party_name)
        .bind(record.party_gstin)
        .bind(record.item_id)
        .bind(record.hsn_code)
        .bind(record.quantity)
        .bind(record.rate)
        .bind(record.tax.taxable_amount)
        .bind(record.gst_rate)
        .bind(record.tax.cgst)
        .bind(record.tax.sgst)
        .bind(record.tax.igst)
        .bind(record.tax.total_amount)
        .bind(record.notes)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("goods_entry"))
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM goods_entries WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("goods_entry"));
        }
        Ok(())
    }

    pub async fn recent_rates(&self, item_id: Uuid, limit: i64) -> Result<Vec<RecentRate>, AppError> {
        let rates = sqlx::query_as::<_, RecentRate>(
            r#"
            SELECT direction, entry_date, rate, quantity
            FROM goods_entries
            WHERE item_id = $1
            ORDER BY entry_date DESC, created_at DESC
            LIMIT $2
            "#,
        )
        .bind(item_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rates)
    }

    /// Outward quantities grouped by month, oldest first.
    pub async fn monthly_outward(&self, item_id: Uuid, months: i32) -> Result<Vec<MonthlyQuantity>, AppError> {
        let history = sqlx::query_as::<_, MonthlyQuantity>(
            r#"
            SELECT to_char(date_trunc('month', entry_date), 'YYYY-MM') AS period,
                   SUM(quantity) AS quantity
            FROM goods_entries
            WHERE item_id = $1
              AND direction = 'OUTWARD'
              AND entry_date >= (date_trunc('month', CURRENT_DATE) - make_interval(months => $2))::date
            GROUP BY 1
            ORDER BY 1 ASC
            "#,
        )
        .bind(item_id)
        .bind(months)
        .fetch_all(&self.pool)
        .await?;
        Ok(history)
    }
}

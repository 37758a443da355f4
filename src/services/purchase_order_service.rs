// src/services/purchase_order_service.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        bookkeeping::{round_money, round_quantity},
        error::AppError,
    },
    db::PurchaseOrderRepository,
    models::purchase_orders::{PurchaseOrder, PurchaseOrderDetail, PurchaseOrderStatus},
};

#[derive(Debug, Clone)]
pub struct OrderLine<'a> {
    pub material_name: &'a str,
    pub item_id: Option<Uuid>,
    pub quantity: Decimal,
    pub rate: Decimal,
}

impl OrderLine<'_> {
    pub fn amount(&self) -> Decimal {
        round_money(round_quantity(self.quantity) * round_money(self.rate))
    }
}

pub fn order_total(lines: &[OrderLine<'_>]) -> Decimal {
    lines.iter().map(OrderLine::amount).sum()
}

// Orders are paperwork only: receiving one books nothing. Stock arrives
// through an inward goods entry.
#[derive(Clone)]
pub struct PurchaseOrderService {
    order_repo: PurchaseOrderRepository,
    pool: PgPool,
}

impl PurchaseOrderService {
    pub fn new(order_repo: PurchaseOrderRepository, pool: PgPool) -> Self {
        Self { order_repo, pool }
    }

    pub async fn list_orders(&self) -> Result<Vec<PurchaseOrder>, AppError> {
        self.order_repo.list().await
    }

    pub async fn get_order(&self, id: Uuid) -> Result<PurchaseOrderDetail, AppError> {
        let header = self
            .order_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("purchase_order"))?;
        let items = self.order_repo.list_items(id).await?;
        Ok(PurchaseOrderDetail { header, items })
    }

    pub async fn create_order(
        &self,
        supplier_name: &str,
        order_date: NaiveDate,
        expected_date: Option<NaiveDate>,
        notes: Option<&str>,
        lines: &[OrderLine<'_>],
    ) -> Result<PurchaseOrderDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        let header = self
            .order_repo
            .create_order(&mut *tx, supplier_name.trim(), order_date, expected_date, notes, order_total(lines))
            .await?;

        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            let item = self
                .order_repo
                .add_item(
                    &mut *tx,
                    header.id,
                    line.material_name.trim(),
                    line.item_id,
                    round_quantity(line.quantity),
                    round_money(line.rate),
                    line.amount(),
                )
                .await?;
            items.push(item);
        }

        tx.commit().await?;

        tracing::info!(display_id = header.display_id, total = %header.total_amount, "Purchase order created");
        Ok(PurchaseOrderDetail { header, items })
    }

    pub async fn transition(&self, id: Uuid, next: PurchaseOrderStatus) -> Result<PurchaseOrder, AppError> {
        let mut tx = self.pool.begin().await?;

        let order = self
            .order_repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("purchase_order"))?;

        if !order.status.can_transition_to(next) {
            return Err(AppError::InvalidStateTransition {
                from: order.status.as_str().to_string(),
                to: next.as_str().to_string(),
            });
        }

        let updated = self.order_repo.set_status(&mut *tx, id, next).await?;
        tx.commit().await?;
        Ok(updated)
    }

    pub async fn delete_order(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let order = self
            .order_repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("purchase_order"))?;

        if !order.status.is_deletable() {
            return Err(AppError::InvalidStateTransition {
                from: order.status.as_str().to_string(),
                to: "DELETED".to_string(),
            });
        }

        self.order_repo.delete(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn total_is_sum_of_rounded_line_amounts() {
        let lines = [
            OrderLine { material_name: "HMS 1&2", item_id: None, quantity: d("5000"), rate: d("38.5") },
            OrderLine { material_name: "Brass honey", item_id: None, quantity: d("12.345"), rate: d("410.10") },
        ];
        assert_eq!(lines[0].amount(), d("192500.00"));
        // 12.345 × 410.10 = 5062.68450 → 5062.68
        assert_eq!(lines[1].amount(), d("5062.68"));
        assert_eq!(order_total(&lines), d("197562.68"));
    }

    #[test]
    fn empty_order_totals_zero() {
        assert_eq!(order_total(&[]), Decimal::ZERO);
    }
}

// src/services/goods_service.rs

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::{
        bookkeeping::{compute_tax, goods_effects, is_intra_state, round_money, round_quantity, Effects},
        error::AppError,
    },
    db::{goods_repo::GoodsRecord, GoodsRepository, InventoryRepository, SettingsRepository},
    models::goods::{GoodsEntry, GoodsEntryPayload, GoodsFilter, GoodsVariant},
    services::posting::Posting,
};

// GST and cash purchase/sale ledgers. Every entry moves stock and one balance.
#[derive(Clone)]
pub struct GoodsService {
    goods_repo: GoodsRepository,
    inventory_repo: InventoryRepository,
    settings_repo: SettingsRepository,
    posting: Posting,
    pool: PgPool,
}

fn effects_of(entry: &GoodsEntry) -> Effects {
    goods_effects(
        entry.direction,
        entry.variant,
        entry.item_id,
        entry.quantity,
        entry.rate,
        entry.total_amount,
    )
}

impl GoodsService {
    pub fn new(
        goods_repo: GoodsRepository,
        inventory_repo: InventoryRepository,
        settings_repo: SettingsRepository,
        posting: Posting,
        pool: PgPool,
    ) -> Self {
        Self { goods_repo, inventory_repo, settings_repo, posting, pool }
    }

    pub async fn list_entries(&self, filter: &GoodsFilter) -> Result<Vec<GoodsEntry>, AppError> {
        self.goods_repo.list(filter).await
    }

    pub async fn get_entry(&self, id: Uuid) -> Result<GoodsEntry, AppError> {
        self.goods_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("goods_entry"))
    }

    pub async fn create_entry(&self, payload: &GoodsEntryPayload) -> Result<GoodsEntry, AppError> {
        let mut tx = self.pool.begin().await?;

        let hsn_default = self.item_hsn(&mut tx, payload.item_id).await?;
        let record = self.record_from(&mut tx, payload, hsn_default.as_deref()).await?;
        let entry = self.goods_repo.create(&mut *tx, &record).await?;

        self.posting
            .apply(&mut tx, &effects_of(&entry), Some(entry.id), entry.invoice_number.as_deref())
            .await?;

        tx.commit().await?;

        tracing::info!(
            id = %entry.id,
            direction = ?entry.direction,
            variant = ?entry.variant,
            total = %entry.total_amount,
            "Goods entry created"
        );
        Ok(entry)
    }

    /// Reverses what the stored entry did and applies the edited version, atomically.
    pub async fn update_entry(&self, id: Uuid, payload: &GoodsEntryPayload) -> Result<GoodsEntry, AppError> {
        let mut tx = self.pool.begin().await?;

        let old = self
            .goods_repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("goods_entry"))?;

        let hsn_default = self.item_hsn(&mut tx, payload.item_id).await?;
        let record = self.record_from(&mut tx, payload, hsn_default.as_deref()).await?;
        let entry = self.goods_repo.update(&mut *tx, id, &record).await?;

        let effects = effects_of(&old).reversed().then(effects_of(&entry));
        self.posting
            .apply(&mut tx, &effects, Some(entry.id), Some("Entry edited"))
            .await?;

        tx.commit().await?;
        Ok(entry)
    }

    pub async fn delete_entry(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let old = self
            .goods_repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("goods_entry"))?;

        self.goods_repo.delete(&mut *tx, id).await?;
        self.posting
            .apply(&mut tx, &effects_of(&old).reversed(), Some(old.id), Some("Entry deleted"))
            .await?;

        tx.commit().await?;

        tracing::info!(id = %old.id, "Goods entry deleted");
        Ok(())
    }

    async fn item_hsn(&self, conn: &mut PgConnection, item_id: Uuid) -> Result<Option<String>, AppError> {
        let item = self
            .inventory_repo
            .find_by_id(&mut *conn, item_id)
            .await?
            .ok_or(AppError::NotFound("item"))?;
        Ok(item.hsn_code)
    }

    async fn record_from<'a>(
        &self,
        conn: &mut PgConnection,
        payload: &'a GoodsEntryPayload,
        hsn_default: Option<&'a str>,
    ) -> Result<GoodsRecord<'a>, AppError> {
        let settings = self.settings_repo.get_settings(&mut *conn).await?;

        let gst_rate = match payload.variant {
            GoodsVariant::Gst => payload.gst_rate,
            GoodsVariant::Cash => Decimal::ZERO,
        };
        let party_gstin = payload.party_gstin.as_deref();
        let intra_state = is_intra_state(settings.effective_state_code().as_deref(), party_gstin);

        let quantity = round_quantity(payload.quantity);
        let rate = round_money(payload.rate);
        let tax = compute_tax(payload.variant, quantity, rate, gst_rate, intra_state);

        Ok(GoodsRecord {
            direction: payload.direction,
            variant: payload.variant,
            entry_date: payload.entry_date,
            invoice_number: payload.invoice_number.as_deref(),
            party_name: payload.party_name.trim(),
            party_gstin,
            item_id: payload.item_id,
            hsn_code: payload.hsn_code.as_deref().or(hsn_default),
            quantity,
            rate,
            gst_rate,
            tax,
            notes: payload.notes.as_deref(),
        })
    }
}

// src/models/inventory.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Inventory item ---
// One row per material. Quantity and average price are maintained by the
// goods ledgers; only descriptive fields are edited directly.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: Uuid,
    #[schema(example = "Copper wire (bare bright)")]
    pub name: String,
    #[schema(example = "Non-ferrous")]
    pub category: Option<String>,
    #[schema(example = "7404")]
    pub hsn_code: Option<String>,
    #[schema(example = "kg")]
    pub unit: String,
    #[schema(example = "1250.500")]
    pub quantity: Decimal,
    #[schema(example = "712.40")]
    pub average_price: Decimal,
    #[schema(example = "100")]
    pub low_stock_threshold: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    pub fn stock_value(&self) -> Decimal {
        (self.quantity * self.average_price).round_dp(2)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "stock_movement_reason", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockMovementReason {
    InitialStock,
    Purchase,
    Sale,
    Correction,
    Reversal,
}

// --- Stock movement (history) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: Uuid,
    pub item_id: Uuid,
    #[schema(example = "-25.000")]
    pub quantity_changed: Decimal,
    pub reason: StockMovementReason,
    pub unit_price: Option<Decimal>,
    /// The goods entry (or other record) that caused the movement.
    pub reference_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

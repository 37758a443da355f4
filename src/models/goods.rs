// src/models/goods.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::balances::BalanceAccount;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "goods_direction", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GoodsDirection {
    Inward,  // purchase
    Outward, // sale
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "goods_variant", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GoodsVariant {
    Gst,
    Cash,
}

impl GoodsVariant {
    /// GST bills settle through the bank, cash bills through the cash box.
    pub fn account(&self) -> BalanceAccount {
        match self {
            GoodsVariant::Gst => BalanceAccount::Bank,
            GoodsVariant::Cash => BalanceAccount::Cash,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GoodsEntry {
    pub id: Uuid,
    pub direction: GoodsDirection,
    pub variant: GoodsVariant,
    #[schema(value_type = String, format = Date, example = "2025-03-14")]
    pub entry_date: NaiveDate,
    #[schema(example = "INV-2025-0142")]
    pub invoice_number: Option<String>,
    #[schema(example = "Shree Metals")]
    pub party_name: String,
    #[schema(example = "27ABCDE1234F1Z5")]
    pub party_gstin: Option<String>,
    pub item_id: Uuid,
    #[schema(example = "Copper wire (bare bright)")]
    pub item_name: String,
    pub hsn_code: Option<String>,
    #[schema(example = "250.000")]
    pub quantity: Decimal,
    #[schema(example = "705.00")]
    pub rate: Decimal,
    pub taxable_amount: Decimal,
    #[schema(example = "18")]
    pub gst_rate: Decimal,
    pub cgst: Decimal,
    pub sgst: Decimal,
    pub igst: Decimal,
    pub total_amount: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct GoodsFilter {
    pub direction: Option<GoodsDirection>,
    pub variant: Option<GoodsVariant>,
    pub item_id: Option<Uuid>,
    #[param(value_type = Option<String>, format = Date)]
    pub from: Option<NaiveDate>,
    #[param(value_type = Option<String>, format = Date)]
    pub to: Option<NaiveDate>,
}

/// Body of create and update. Tax amounts are always computed server-side.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GoodsEntryPayload {
    pub direction: GoodsDirection,
    pub variant: GoodsVariant,

    #[schema(value_type = String, format = Date, example = "2025-03-14")]
    pub entry_date: NaiveDate,

    pub invoice_number: Option<String>,

    #[validate(length(min = 1, message = "Party name is required."))]
    pub party_name: String,

    #[serde(default, deserialize_with = "crate::common::validation::blank_as_none")]
    #[validate(length(equal = 15, message = "GSTIN must have 15 characters."))]
    pub party_gstin: Option<String>,

    pub item_id: Uuid,

    /// Defaults to the item's HSN code.
    pub hsn_code: Option<String>,

    #[validate(custom(function = "crate::common::validation::validate_positive_quantity"))]
    pub quantity: Decimal,

    #[validate(custom(function = "crate::common::validation::validate_not_negative"))]
    pub rate: Decimal,

    #[serde(default)]
    #[validate(custom(function = "crate::common::validation::validate_gst_rate"))]
    #[schema(example = "18")]
    pub gst_rate: Decimal,

    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(gstin: serde_json::Value) -> GoodsEntryPayload {
        serde_json::from_value(json!({
            "direction": "OUTWARD",
            "variant": "GST",
            "entryDate": "2025-03-14",
            "partyName": "Mahalaxmi Metals",
            "partyGstin": gstin,
            "itemId": Uuid::new_v4(),
            "quantity": 12.5,
            "rate": 410,
            "gstRate": 18
        }))
        .unwrap()
    }

    #[test]
    fn blank_gstin_is_treated_as_absent() {
        for blank in [json!(""), json!("   "), json!(null)] {
            let p = payload(blank);
            assert_eq!(p.party_gstin, None);
            assert!(p.validate().is_ok());
        }
    }

    #[test]
    fn gstin_is_trimmed_before_the_length_check() {
        let p = payload(json!(" 27AAPFU0939F1ZV "));
        assert_eq!(p.party_gstin.as_deref(), Some("27AAPFU0939F1ZV"));
        assert!(p.validate().is_ok());

        assert!(payload(json!("27AAPFU0939F1Z")).validate().is_err());
    }
}

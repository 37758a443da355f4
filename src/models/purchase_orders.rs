// src/models/purchase_orders.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "purchase_order_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PurchaseOrderStatus {
    Draft,
    Ordered,
    Received,
    Cancelled,
}

impl PurchaseOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseOrderStatus::Draft => "DRAFT",
            PurchaseOrderStatus::Ordered => "ORDERED",
            PurchaseOrderStatus::Received => "RECEIVED",
            PurchaseOrderStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn can_transition_to(&self, next: PurchaseOrderStatus) -> bool {
        use PurchaseOrderStatus::*;
        matches!(
            (self, next),
            (Draft, Ordered) | (Ordered, Received) | (Draft, Cancelled) | (Ordered, Cancelled)
        )
    }

    /// Orders that never reached the supplier, or were called off, may be removed.
    pub fn is_deletable(&self) -> bool {
        matches!(self, PurchaseOrderStatus::Draft | PurchaseOrderStatus::Cancelled)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrder {
    pub id: Uuid,
    #[schema(example = 42)]
    pub display_id: i32,
    #[schema(example = "Maharashtra Alloys")]
    pub supplier_name: String,
    #[schema(value_type = String, format = Date)]
    pub order_date: NaiveDate,
    #[schema(value_type = Option<String>, format = Date)]
    pub expected_date: Option<NaiveDate>,
    pub status: PurchaseOrderStatus,
    pub notes: Option<String>,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderItem {
    pub id: Uuid,
    pub purchase_order_id: Uuid,
    #[schema(example = "HMS 1&2 steel scrap")]
    pub material_name: String,
    pub item_id: Option<Uuid>,
    #[schema(example = "5000.000")]
    pub quantity: Decimal,
    #[schema(example = "38.50")]
    pub rate: Decimal,
    pub amount: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderDetail {
    #[serde(flatten)]
    pub header: PurchaseOrder,
    pub items: Vec<PurchaseOrderItem>,
}

#[cfg(test)]
mod tests {
    use super::PurchaseOrderStatus::*;

    #[test]
    fn forward_transitions_are_allowed() {
        assert!(Draft.can_transition_to(Ordered));
        assert!(Ordered.can_transition_to(Received));
        assert!(Draft.can_transition_to(Cancelled));
        assert!(Ordered.can_transition_to(Cancelled));
    }

    #[test]
    fn terminal_states_are_final() {
        for next in [Draft, Ordered, Received, Cancelled] {
            assert!(!Received.can_transition_to(next));
            assert!(!Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn no_skipping_or_going_back() {
        assert!(!Draft.can_transition_to(Received));
        assert!(!Ordered.can_transition_to(Draft));
        assert!(!Draft.can_transition_to(Draft));
    }

    #[test]
    fn only_draft_and_cancelled_orders_are_deletable() {
        assert!(Draft.is_deletable());
        assert!(Cancelled.is_deletable());
        assert!(!Ordered.is_deletable());
        assert!(!Received.is_deletable());
    }
}

// src/services/export_service.rs

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        csv_io::{read_csv, write_csv, RowError},
        error::AppError,
    },
    db::{
        inventory_repo::ItemFields, ExpenseRepository, GoodsRepository, InventoryRepository,
        LedgerRepository, StaffRepository,
    },
    models::{
        data::{Dataset, ImportSummary, InventoryCsvRow},
        expenses::Expense,
        goods::{GoodsEntry, GoodsFilter},
        inventory::InventoryItem,
        ledger::LedgerEntry,
        staff::{AttendanceFilter, AttendanceRecord, StaffFilter},
    },
    services::inventory_service::{InventoryService, Upserted},
};

// ---
// Export rows
// ---

#[derive(Debug, Serialize)]
pub struct InventoryExportRow {
    pub name: String,
    pub category: String,
    pub hsn_code: String,
    pub unit: String,
    pub quantity: Decimal,
    pub average_price: Decimal,
    pub low_stock_threshold: Decimal,
    pub stock_value: Decimal,
}

impl From<&InventoryItem> for InventoryExportRow {
    fn from(item: &InventoryItem) -> Self {
        Self {
            name: item.name.clone(),
            category: item.category.clone().unwrap_or_default(),
            hsn_code: item.hsn_code.clone().unwrap_or_default(),
            unit: item.unit.clone(),
            quantity: item.quantity,
            average_price: item.average_price,
            low_stock_threshold: item.low_stock_threshold,
            stock_value: item.stock_value(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GoodsExportRow {
    pub entry_date: NaiveDate,
    pub direction: &'static str,
    pub variant: &'static str,
    pub invoice_number: String,
    pub party_name: String,
    pub party_gstin: String,
    pub item: String,
    pub hsn_code: String,
    pub quantity: Decimal,
    pub rate: Decimal,
    pub taxable_amount: Decimal,
    pub gst_rate: Decimal,
    pub cgst: Decimal,
    pub sgst: Decimal,
    pub igst: Decimal,
    pub total_amount: Decimal,
}

impl From<&GoodsEntry> for GoodsExportRow {
    fn from(entry: &GoodsEntry) -> Self {
        use crate::models::goods::{GoodsDirection, GoodsVariant};
        Self {
            entry_date: entry.entry_date,
            direction: match entry.direction {
                GoodsDirection::Inward => "INWARD",
                GoodsDirection::Outward => "OUTWARD",
            },
            variant: match entry.variant {
                GoodsVariant::Gst => "GST",
                GoodsVariant::Cash => "CASH",
            },
            invoice_number: entry.invoice_number.clone().unwrap_or_default(),
            party_name: entry.party_name.clone(),
            party_gstin: entry.party_gstin.clone().unwrap_or_default(),
            item: entry.item_name.clone(),
            hsn_code: entry.hsn_code.clone().unwrap_or_default(),
            quantity: entry.quantity,
            rate: entry.rate,
            taxable_amount: entry.taxable_amount,
            gst_rate: entry.gst_rate,
            cgst: entry.cgst,
            sgst: entry.sgst,
            igst: entry.igst,
            total_amount: entry.total_amount,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ExpenseExportRow {
    pub expense_date: NaiveDate,
    pub category: String,
    pub description: String,
    pub amount: Decimal,
    pub paid_from: &'static str,
}

impl From<&Expense> for ExpenseExportRow {
    fn from(expense: &Expense) -> Self {
        Self {
            expense_date: expense.expense_date,
            category: expense.category.clone(),
            description: expense.description.clone().unwrap_or_default(),
            amount: expense.amount,
            paid_from: expense.paid_from.as_str(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LedgerExportRow {
    pub entry_date: NaiveDate,
    pub person_name: String,
    pub phone: String,
    pub kind: &'static str,
    pub amount: Decimal,
    pub due_date: Option<NaiveDate>,
    pub status: &'static str,
    pub settled_on: Option<NaiveDate>,
    pub notes: String,
}

impl From<&LedgerEntry> for LedgerExportRow {
    fn from(entry: &LedgerEntry) -> Self {
        use crate::models::ledger::LedgerKind;
        Self {
            entry_date: entry.entry_date,
            person_name: entry.person_name.clone(),
            phone: entry.phone.clone().unwrap_or_default(),
            kind: match entry.kind {
                LedgerKind::Given => "GIVEN",
                LedgerKind::Taken => "TAKEN",
            },
            amount: entry.amount,
            due_date: entry.due_date,
            status: entry.status.as_str(),
            settled_on: entry.settled_on,
            notes: entry.notes.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AttendanceExportRow {
    pub attendance_date: NaiveDate,
    pub staff_name: String,
    pub status: &'static str,
    pub notes: String,
}

impl AttendanceExportRow {
    fn new(record: &AttendanceRecord, names: &HashMap<Uuid, String>) -> Self {
        use crate::models::staff::AttendanceStatus;
        Self {
            attendance_date: record.attendance_date,
            staff_name: names.get(&record.staff_id).cloned().unwrap_or_default(),
            status: match record.status {
                AttendanceStatus::Present => "PRESENT",
                AttendanceStatus::Absent => "ABSENT",
                AttendanceStatus::HalfDay => "HALF_DAY",
                AttendanceStatus::Leave => "LEAVE",
            },
            notes: record.notes.clone().unwrap_or_default(),
        }
    }
}

// ---
// Service
// ---

#[derive(Clone)]
pub struct ExportService {
    inventory_repo: InventoryRepository,
    goods_repo: GoodsRepository,
    expense_repo: ExpenseRepository,
    ledger_repo: LedgerRepository,
    staff_repo: StaffRepository,
    inventory_service: InventoryService,
    pool: PgPool,
}

impl ExportService {
    pub fn new(
        inventory_repo: InventoryRepository,
        goods_repo: GoodsRepository,
        expense_repo: ExpenseRepository,
        ledger_repo: LedgerRepository,
        staff_repo: StaffRepository,
        inventory_service: InventoryService,
        pool: PgPool,
    ) -> Self {
        Self { inventory_repo, goods_repo, expense_repo, ledger_repo, staff_repo, inventory_service, pool }
    }

    pub async fn export(&self, dataset: Dataset) -> Result<Vec<u8>, AppError> {
        match dataset {
            Dataset::Inventory => {
                let items = self.inventory_repo.get_all_items().await?;
                write_csv(items.iter().map(InventoryExportRow::from))
            }
            Dataset::Goods => {
                let entries = self.goods_repo.list(&GoodsFilter::default()).await?;
                write_csv(entries.iter().map(GoodsExportRow::from))
            }
            Dataset::Expenses => {
                let expenses = self.expense_repo.list(None, None).await?;
                write_csv(expenses.iter().map(ExpenseExportRow::from))
            }
            Dataset::Ledger => {
                let entries = self.ledger_repo.list(None).await?;
                write_csv(entries.iter().map(LedgerExportRow::from))
            }
            Dataset::Attendance => {
                let names: HashMap<Uuid, String> = self
                    .staff_repo
                    .list(&StaffFilter::default())
                    .await?
                    .into_iter()
                    .map(|m| (m.id, m.name))
                    .collect();
                let records = self.staff_repo.list_attendance(&AttendanceFilter::default()).await?;
                write_csv(records.iter().map(|r| AttendanceExportRow::new(r, &names)))
            }
        }
    }

    /// Bad rows are reported and skipped. Good rows are written in one transaction.
    pub async fn import_inventory(&self, data: &[u8]) -> Result<ImportSummary, AppError> {
        let (rows, mut errors) = read_csv::<InventoryCsvRow>(data, InventoryCsvRow::REQUIRED_COLUMNS)?;
        let mut summary = ImportSummary::default();

        let mut tx = self.pool.begin().await?;
        for (line, row) in rows {
            if let Err(message) = row.check() {
                errors.push(RowError { line, message });
                continue;
            }

            let fields = ItemFields {
                name: row.name.trim(),
                category: row.category.as_deref(),
                hsn_code: row.hsn_code.as_deref(),
                unit: row.unit.as_deref().unwrap_or("kg"),
                low_stock_threshold: row.low_stock_threshold.unwrap_or(Decimal::ZERO),
            };

            let outcome = self
                .inventory_service
                .upsert_by_name(
                    &mut tx,
                    &fields,
                    row.quantity.unwrap_or(Decimal::ZERO),
                    row.average_price.unwrap_or(Decimal::ZERO),
                )
                .await?;

            match outcome {
                Upserted::Created => summary.created += 1,
                Upserted::Updated => summary.updated += 1,
            }
        }
        tx.commit().await?;

        errors.sort_by_key(|e| e.line);
        summary.errors = errors;

        tracing::info!(
            created = summary.created,
            updated = summary.updated,
            rejected = summary.errors.len(),
            "Inventory import finished"
        );
        Ok(summary)
    }
}

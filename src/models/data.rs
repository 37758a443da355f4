// src/models/data.rs

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::common::{csv_io::RowError, error::AppError};

/// Tables that can be exported as CSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Dataset {
    Inventory,
    Goods,
    Expenses,
    Ledger,
    Attendance,
}

impl Dataset {
    pub fn file_name(&self) -> &'static str {
        match self {
            Dataset::Inventory => "inventory.csv",
            Dataset::Goods => "goods.csv",
            Dataset::Expenses => "expenses.csv",
            Dataset::Ledger => "ledger.csv",
            Dataset::Attendance => "attendance.csv",
        }
    }
}

impl FromStr for Dataset {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inventory" => Ok(Dataset::Inventory),
            "goods" => Ok(Dataset::Goods),
            "expenses" => Ok(Dataset::Expenses),
            "ledger" => Ok(Dataset::Ledger),
            "attendance" => Ok(Dataset::Attendance),
            other => Err(AppError::UnknownDataset(other.to_string())),
        }
    }
}

/// One row of an inventory import file. Only `name` is mandatory.
#[derive(Debug, Clone, Deserialize)]
pub struct InventoryCsvRow {
    pub name: String,
    pub category: Option<String>,
    pub hsn_code: Option<String>,
    pub unit: Option<String>,
    pub quantity: Option<Decimal>,
    pub average_price: Option<Decimal>,
    pub low_stock_threshold: Option<Decimal>,
}

impl InventoryCsvRow {
    pub const REQUIRED_COLUMNS: &'static [&'static str] = &["name"];

    /// Semantic checks the CSV parser cannot make.
    pub fn check(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name is required".into());
        }
        for (field, value) in [
            ("quantity", self.quantity),
            ("average_price", self.average_price),
            ("low_stock_threshold", self.low_stock_threshold),
        ] {
            if value.is_some_and(|v| v.is_sign_negative() && !v.is_zero()) {
                return Err(format!("{} cannot be negative", field));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub created: usize,
    pub updated: usize,
    pub errors: Vec<RowError>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::csv_io::read_csv;

    #[test]
    fn dataset_names_are_case_insensitive() {
        assert_eq!("Goods".parse::<Dataset>().unwrap(), Dataset::Goods);
        assert!(matches!("payroll".parse::<Dataset>(), Err(AppError::UnknownDataset(name)) if name == "payroll"));
    }

    #[test]
    fn import_rows_accept_blank_optionals() {
        let data = b"name,category,hsn_code,unit,quantity,average_price,low_stock_threshold\n\
                     Brass honey,Non-ferrous,7404,kg,120.5,410,50\n\
                     Lead,,,,,,\n";
        let (rows, errors) = read_csv::<InventoryCsvRow>(data, InventoryCsvRow::REQUIRED_COLUMNS).unwrap();
        assert!(errors.is_empty());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].1.quantity, Some("120.5".parse().unwrap()));
        assert_eq!(rows[1].1.unit, None);
        assert!(rows[1].1.check().is_ok());
    }

    #[test]
    fn negative_quantities_fail_the_row_check() {
        let row = InventoryCsvRow {
            name: "Zinc".into(),
            category: None,
            hsn_code: None,
            unit: None,
            quantity: Some("-3".parse().unwrap()),
            average_price: None,
            low_stock_threshold: None,
        };
        assert_eq!(row.check().unwrap_err(), "quantity cannot be negative");
    }
}

pub mod ai;
pub mod auth;
pub mod balances;
pub mod dashboard;
pub mod data;
pub mod expenses;
pub mod goods;
pub mod inventory;
pub mod ledger;
pub mod purchase_orders;
pub mod settings;
pub mod staff;

pub mod ai_service;
pub mod auth;
pub mod balance_service;
pub mod dashboard_service;
pub mod document_service;
pub mod expense_service;
pub mod export_service;
pub mod goods_service;
pub mod inventory_service;
pub mod ledger_service;
pub mod posting;
pub mod purchase_order_service;
pub mod staff_service;

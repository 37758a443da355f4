pub mod user_repo;
pub use user_repo::UserRepository;
pub mod balance_repo;
pub use balance_repo::BalanceRepository;
pub mod inventory_repo;
pub use inventory_repo::InventoryRepository;
pub mod goods_repo;
pub use goods_repo::GoodsRepository;
pub mod expense_repo;
pub use expense_repo::ExpenseRepository;
pub mod ledger_repo;
pub use ledger_repo::LedgerRepository;
pub mod purchase_order_repo;
pub use purchase_order_repo::PurchaseOrderRepository;
pub mod staff_repo;
pub use staff_repo::StaffRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
pub mod settings_repo;
pub use settings_repo::SettingsRepository;

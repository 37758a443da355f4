// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,
        handlers::auth::list_users,
        handlers::auth::update_user_role,
        handlers::auth::delete_user,

        // --- Balances ---
        handlers::balances::get_balances,
        handlers::balances::set_opening_balances,

        // --- Inventory ---
        handlers::inventory::create_item,
        handlers::inventory::get_all_items,
        handlers::inventory::get_item,
        handlers::inventory::update_item,
        handlers::inventory::delete_item,
        handlers::inventory::adjust_stock,
        handlers::inventory::list_movements,
        handlers::inventory::get_low_stock,

        // --- Goods ---
        handlers::goods::create_entry,
        handlers::goods::list_entries,
        handlers::goods::get_entry,
        handlers::goods::update_entry,
        handlers::goods::delete_entry,
        handlers::goods::invoice_pdf,

        // --- Expenses ---
        handlers::expenses::create_expense,
        handlers::expenses::list_expenses,
        handlers::expenses::update_expense,
        handlers::expenses::delete_expense,

        // --- Ledger ---
        handlers::ledger::create_entry,
        handlers::ledger::list_entries,
        handlers::ledger::get_summary,
        handlers::ledger::settle_entry,
        handlers::ledger::delete_entry,

        // --- Purchase orders ---
        handlers::purchase_orders::create_order,
        handlers::purchase_orders::list_orders,
        handlers::purchase_orders::get_order,
        handlers::purchase_orders::transition_order,
        handlers::purchase_orders::delete_order,

        // --- Staff, attendance, wages ---
        handlers::staff::create_staff,
        handlers::staff::list_staff,
        handlers::staff::get_staff,
        handlers::staff::update_staff,
        handlers::staff::set_active,
        handlers::staff::mark_attendance,
        handlers::staff::mark_bulk,
        handlers::staff::list_attendance,
        handlers::staff::wage_summary,
        handlers::staff::record_wage_payment,
        handlers::staff::list_wage_payments,
        handlers::staff::delete_wage_payment,

        // --- Dashboard ---
        handlers::dashboard::get_summary,

        // --- AI ---
        handlers::ai::suggest_price,
        handlers::ai::forecast_demand,

        // --- Data ---
        handlers::data::export_dataset,
        handlers::data::import_inventory,

        // --- Settings ---
        handlers::settings::get_settings,
        handlers::settings::update_settings,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::UpdateRolePayload,
            models::auth::AuthResponse,

            // --- Balances ---
            models::balances::BalanceAccount,
            models::balances::Balances,
            models::balances::SetBalancesPayload,

            // --- Inventory ---
            models::inventory::InventoryItem,
            models::inventory::StockMovementReason,
            models::inventory::StockMovement,
            handlers::inventory::CreateItemPayload,
            handlers::inventory::UpdateItemPayload,
            handlers::inventory::AdjustStockPayload,

            // --- Goods ---
            models::goods::GoodsDirection,
            models::goods::GoodsVariant,
            models::goods::GoodsEntry,
            models::goods::GoodsEntryPayload,

            // --- Expenses ---
            models::expenses::Expense,
            handlers::expenses::ExpensePayload,

            // --- Ledger ---
            models::ledger::LedgerKind,
            models::ledger::LedgerStatus,
            models::ledger::LedgerEntry,
            models::ledger::LedgerSummary,
            handlers::ledger::CreateLedgerEntryPayload,
            handlers::ledger::SettleLedgerEntryPayload,

            // --- Purchase orders ---
            models::purchase_orders::PurchaseOrderStatus,
            models::purchase_orders::PurchaseOrder,
            models::purchase_orders::PurchaseOrderItem,
            models::purchase_orders::PurchaseOrderDetail,
            handlers::purchase_orders::OrderLinePayload,
            handlers::purchase_orders::CreateOrderPayload,
            handlers::purchase_orders::TransitionOrderPayload,

            // --- Staff ---
            models::staff::StaffKind,
            models::staff::WageBasis,
            models::staff::AttendanceStatus,
            models::staff::StaffMember,
            models::staff::AttendanceRecord,
            models::staff::WagePayment,
            models::staff::WageSummaryEntry,
            handlers::staff::StaffPayload,
            handlers::staff::SetActivePayload,
            handlers::staff::MarkAttendancePayload,
            handlers::staff::AttendanceMark,
            handlers::staff::BulkAttendancePayload,
            handlers::staff::WagePaymentPayload,

            // --- Dashboard ---
            models::dashboard::DashboardSummary,

            // --- AI ---
            models::ai::Confidence,
            models::ai::Trend,
            models::ai::PriceSuggestionRequest,
            models::ai::PriceSuggestion,
            models::ai::HistoryPoint,
            models::ai::DemandForecastRequest,
            models::ai::ForecastPoint,
            models::ai::DemandForecast,

            // --- Data ---
            models::data::Dataset,
            models::data::ImportSummary,
            crate::common::csv_io::RowError,

            // --- Settings ---
            models::settings::BusinessSettings,
            models::settings::UpdateSettingsRequest,
        )
    ),
    tags(
        (name = "Auth", description = "Registration and login"),
        (name = "Users", description = "Accounts and roles"),
        (name = "Balances", description = "Bank and cash balances"),
        (name = "Inventory", description = "Materials, stock levels and corrections"),
        (name = "Goods", description = "GST and cash purchases and sales"),
        (name = "Expenses", description = "Operating expenses"),
        (name = "Ledger", description = "Informal loans given and taken"),
        (name = "Purchase Orders", description = "Orders placed with suppliers"),
        (name = "Staff", description = "Staff and labourers"),
        (name = "Attendance", description = "Daily attendance"),
        (name = "Wages", description = "Wage summaries and payments"),
        (name = "Dashboard", description = "Headline figures"),
        (name = "AI", description = "Price suggestions and demand forecasts"),
        (name = "Data", description = "CSV export and import"),
        (name = "Settings", description = "Business details for invoices and tax")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_group_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/register",
            "/api/goods/{id}/invoice",
            "/api/wages/summary",
            "/api/data/export/{dataset}",
            "/api/ai/forecast-demand",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{} missing", path);
        }
        assert!(doc.components.unwrap().security_schemes.contains_key("api_jwt"));
    }
}

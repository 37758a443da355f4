// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{
        BalanceRepository, DashboardRepository, ExpenseRepository, GoodsRepository,
        InventoryRepository, LedgerRepository, PurchaseOrderRepository, SettingsRepository,
        StaffRepository, UserRepository,
    },
    services::{
        ai_service::{AiService, DisabledModel, GeminiClient, GenerativeModel},
        auth::AuthService,
        balance_service::BalanceService,
        dashboard_service::DashboardService,
        document_service::DocumentService,
        expense_service::ExpenseService,
        export_service::ExportService,
        goods_service::GoodsService,
        inventory_service::InventoryService,
        ledger_service::LedgerService,
        posting::Posting,
        purchase_order_service::PurchaseOrderService,
        staff_service::StaffService,
    },
};

const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Everything read from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub ai_timeout: Duration,
    pub pdf_font_dir: String,
    pub pdf_font_name: String,
    pub cors_allowed_origin: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key/value source; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &str| get(key).with_context(|| format!("{} must be set", key));

        let database_max_connections = match get("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse::<u32>()
                .with_context(|| format!("DATABASE_MAX_CONNECTIONS is not a number: {}", raw))?,
            None => 5,
        };
        let ai_timeout_secs = match get("AI_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("AI_TIMEOUT_SECS is not a number: {}", raw))?,
            None => 30,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            database_max_connections,
            jwt_secret: required("JWT_SECRET")?,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            gemini_api_key: get("GEMINI_API_KEY"),
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| "gemini-1.5-flash".to_string()),
            gemini_base_url: get("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            ai_timeout: Duration::from_secs(ai_timeout_secs),
            pdf_font_dir: get("PDF_FONT_DIR").unwrap_or_else(|| "./fonts".to_string()),
            pdf_font_name: get("PDF_FONT_NAME").unwrap_or_else(|| "LiberationSans".to_string()),
            cors_allowed_origin: get("CORS_ALLOWED_ORIGIN"),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub i18n_store: I18nStore,
    pub settings_repo: SettingsRepository,
    pub auth_service: AuthService,
    pub balance_service: BalanceService,
    pub inventory_service: InventoryService,
    pub goods_service: GoodsService,
    pub expense_service: ExpenseService,
    pub ledger_service: LedgerService,
    pub purchase_order_service: PurchaseOrderService,
    pub staff_service: StaffService,
    pub dashboard_service: DashboardService,
    pub ai_service: AiService,
    pub document_service: DocumentService,
    pub export_service: ExportService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = Config::from_env()?;

        let db_pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Could not connect to the database")?;

        tracing::info!("Database connection established");

        let model: Arc<dyn GenerativeModel> = match &config.gemini_api_key {
            Some(key) => Arc::new(GeminiClient::new(
                key.clone(),
                config.gemini_model.clone(),
                config.gemini_base_url.clone(),
                config.ai_timeout,
            )?),
            None => {
                tracing::warn!("GEMINI_API_KEY is not set; AI endpoints will answer 503");
                Arc::new(DisabledModel)
            }
        };

        Self::from_parts(db_pool, config, model)
    }

    /// Wires repositories and services around an existing pool and model.
    pub fn from_parts(
        db_pool: PgPool,
        config: Config,
        model: Arc<dyn GenerativeModel>,
    ) -> anyhow::Result<Self> {
        let i18n_store = I18nStore::load()?;

        // --- Repositories ---
        let user_repo = UserRepository::new(db_pool.clone());
        let balance_repo = BalanceRepository::new(db_pool.clone());
        let inventory_repo = InventoryRepository::new(db_pool.clone());
        let goods_repo = GoodsRepository::new(db_pool.clone());
        let expense_repo = ExpenseRepository::new(db_pool.clone());
        let ledger_repo = LedgerRepository::new(db_pool.clone());
        let order_repo = PurchaseOrderRepository::new(db_pool.clone());
        let staff_repo = StaffRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new(db_pool.clone());
        let settings_repo = SettingsRepository::new(db_pool.clone());

        // --- Services ---
        let posting = Posting::new(inventory_repo.clone(), balance_repo.clone());

        let auth_service = AuthService::new(user_repo, config.jwt_secret.clone(), db_pool.clone());
        let balance_service = BalanceService::new(balance_repo, db_pool.clone());
        let inventory_service =
            InventoryService::new(inventory_repo.clone(), posting.clone(), db_pool.clone());
        let goods_service = GoodsService::new(
            goods_repo.clone(),
            inventory_repo.clone(),
            settings_repo.clone(),
            posting.clone(),
            db_pool.clone(),
        );
        let expense_service = ExpenseService::new(expense_repo.clone(), posting.clone(), db_pool.clone());
        let ledger_service = LedgerService::new(ledger_repo.clone(), posting.clone(), db_pool.clone());
        let purchase_order_service = PurchaseOrderService::new(order_repo, db_pool.clone());
        let staff_service = StaffService::new(staff_repo.clone(), posting, db_pool.clone());
        let dashboard_service = DashboardService::new(dashboard_repo);
        let ai_service = AiService::new(model, goods_repo.clone());
        let document_service = DocumentService::new(
            goods_repo.clone(),
            settings_repo.clone(),
            db_pool.clone(),
            config.pdf_font_dir.clone(),
            config.pdf_font_name.clone(),
        );
        let export_service = ExportService::new(
            inventory_repo,
            goods_repo,
            expense_repo,
            ledger_repo,
            staff_repo,
            inventory_service.clone(),
            db_pool.clone(),
        );

        Ok(Self {
            db_pool,
            config: Arc::new(config),
            i18n_store,
            settings_repo,
            auth_service,
            balance_service,
            inventory_service,
            goods_service,
            expense_service,
            ledger_service,
            purchase_order_service,
            staff_service,
            dashboard_service,
            ai_service,
            document_service,
            export_service,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_required_values_are_set() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/scrapflow"),
            ("JWT_SECRET", "s3cret"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.gemini_model, "gemini-1.5-flash");
        assert_eq!(config.gemini_base_url, DEFAULT_GEMINI_BASE_URL);
        assert_eq!(config.ai_timeout, Duration::from_secs(30));
        assert_eq!(config.pdf_font_dir, "./fonts");
        assert!(config.gemini_api_key.is_none());
        assert!(config.cors_allowed_origin.is_none());
    }

    #[test]
    fn missing_secret_is_an_error() {
        let err = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/x")])).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/x"),
            ("JWT_SECRET", "s"),
            ("GEMINI_API_KEY", "   "),
        ]))
        .unwrap();
        assert!(config.gemini_api_key.is_none());
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/x"),
            ("JWT_SECRET", "s"),
            ("AI_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("AI_TIMEOUT_SECS"));
    }
}

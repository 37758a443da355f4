// src/lib.rs

use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use crate::{config::AppState, docs::ApiDoc, middleware::auth::auth_guard};

fn cors_layer(allowed_origin: Option<&str>) -> anyhow::Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT_LANGUAGE]);

    Ok(match allowed_origin {
        Some(origin) => layer.allow_origin(
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("CORS_ALLOWED_ORIGIN is not a valid origin: {}", origin))?,
        ),
        None => layer.allow_origin(Any),
    })
}

/// The whole HTTP surface. `main` serves it; router tests call it directly.
pub fn build_router(app_state: AppState) -> anyhow::Result<Router> {
    let cors = cors_layer(app_state.config.cors_allowed_origin.as_deref())?;

    // Public; register also accepts an admin's token once the first user exists
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    let user_routes = Router::new()
        .route("/", get(handlers::auth::list_users))
        .route("/me", get(handlers::auth::get_me))
        .route("/{id}", axum::routing::delete(handlers::auth::delete_user))
        .route("/{id}/role", put(handlers::auth::update_user_role));

    let balance_routes = Router::new().route(
        "/",
        get(handlers::balances::get_balances).put(handlers::balances::set_opening_balances),
    );

    let inventory_routes = Router::new()
        .route(
            "/items",
            post(handlers::inventory::create_item).get(handlers::inventory::get_all_items),
        )
        .route(
            "/items/{id}",
            get(handlers::inventory::get_item)
                .put(handlers::inventory::update_item)
                .delete(handlers::inventory::delete_item),
        )
        .route("/items/{id}/adjust", post(handlers::inventory::adjust_stock))
        .route("/items/{id}/movements", get(handlers::inventory::list_movements))
        .route("/low-stock", get(handlers::inventory::get_low_stock));

    let goods_routes = Router::new()
        .route(
            "/",
            post(handlers::goods::create_entry).get(handlers::goods::list_entries),
        )
        .route(
            "/{id}",
            get(handlers::goods::get_entry)
                .put(handlers::goods::update_entry)
                .delete(handlers::goods::delete_entry),
        )
        .route("/{id}/invoice", get(handlers::goods::invoice_pdf));

    let expense_routes = Router::new()
        .route(
            "/",
            post(handlers::expenses::create_expense).get(handlers::expenses::list_expenses),
        )
        .route(
            "/{id}",
            put(handlers::expenses::update_expense).delete(handlers::expenses::delete_expense),
        );

    let ledger_routes = Router::new()
        .route(
            "/",
            post(handlers::ledger::create_entry).get(handlers::ledger::list_entries),
        )
        .route("/summary", get(handlers::ledger::get_summary))
        .route("/{id}", axum::routing::delete(handlers::ledger::delete_entry))
        .route("/{id}/settle", post(handlers::ledger::settle_entry));

    let purchase_order_routes = Router::new()
        .route(
            "/",
            post(handlers::purchase_orders::create_order).get(handlers::purchase_orders::list_orders),
        )
        .route(
            "/{id}",
            get(handlers::purchase_orders::get_order).delete(handlers::purchase_orders::delete_order),
        )
        .route("/{id}/status", post(handlers::purchase_orders::transition_order));

    let staff_routes = Router::new()
        .route(
            "/",
            post(handlers::staff::create_staff).get(handlers::staff::list_staff),
        )
        .route(
            "/{id}",
            get(handlers::staff::get_staff).put(handlers::staff::update_staff),
        )
        .route("/{id}/active", put(handlers::staff::set_active));

    let attendance_routes = Router::new()
        .route(
            "/",
            post(handlers::staff::mark_attendance).get(handlers::staff::list_attendance),
        )
        .route("/bulk", post(handlers::staff::mark_bulk));

    let wage_routes = Router::new()
        .route("/summary", get(handlers::staff::wage_summary))
        .route(
            "/payments",
            post(handlers::staff::record_wage_payment).get(handlers::staff::list_wage_payments),
        )
        .route("/payments/{id}", axum::routing::delete(handlers::staff::delete_wage_payment));

    let ai_routes = Router::new()
        .route("/suggest-price", post(handlers::ai::suggest_price))
        .route("/forecast-demand", post(handlers::ai::forecast_demand));

    let data_routes = Router::new()
        .route("/export/{dataset}", get(handlers::data::export_dataset))
        .route("/import/inventory", post(handlers::data::import_inventory));

    let protected_routes = Router::new()
        .nest("/users", user_routes)
        .nest("/balances", balance_routes)
        .nest("/inventory", inventory_routes)
        .nest("/goods", goods_routes)
        .nest("/expenses", expense_routes)
        .nest("/ledger", ledger_routes)
        .nest("/purchase-orders", purchase_order_routes)
        .nest("/staff", staff_routes)
        .nest("/attendance", attendance_routes)
        .nest("/wages", wage_routes)
        .nest("/ai", ai_routes)
        .nest("/data", data_routes)
        .route("/dashboard/summary", get(handlers::dashboard::get_summary))
        .route(
            "/settings",
            get(handlers::settings::get_settings).put(handlers::settings::update_settings),
        )
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api", protected_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state);

    Ok(app)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_cors_origin_is_a_startup_error() {
        assert!(cors_layer(Some("https://ok.example")).is_ok());
        assert!(cors_layer(Some("bad\norigin")).is_err());
    }
}

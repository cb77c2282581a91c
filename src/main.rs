//src/main.rs

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod models;
mod services;

use crate::config::{AppState, Settings};
use crate::docs::ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logger primeiro, para registrar até as falhas de configuração.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let settings = Settings::from_env()?;
    let app_state = AppState::new(&settings).await?;

    let dashboard_routes = Router::new()
        .route("/bounds", get(handlers::dashboard::get_date_bounds))
        .route("/brands", get(handlers::dashboard::get_brands))
        .route("/totals", get(handlers::dashboard::get_totals))
        .route("/daily", get(handlers::dashboard::get_daily));

    let insight_routes = Router::new()
        .route("/", post(handlers::insights::ask))
        .route("/totals", post(handlers::insights::totals_insight))
        .route("/daily", post(handlers::insights::daily_insight));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/", get(handlers::page::dashboard_page))
        .route("/api/health", get(handlers::dashboard::health))
        .nest("/api/dashboard", dashboard_routes)
        .nest("/api/insights", insight_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("🚀 Dashboard escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

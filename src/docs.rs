// src/docs.rs

use utoipa::OpenApi;
use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Dashboard ---
        handlers::dashboard::get_date_bounds,
        handlers::dashboard::get_brands,
        handlers::dashboard::get_totals,
        handlers::dashboard::get_daily,

        // --- Insights ---
        handlers::insights::ask,
        handlers::insights::totals_insight,
        handlers::insights::daily_insight,
    ),
    components(
        schemas(
            // --- DASHBOARD ---
            models::dashboard::Dimension,
            models::dashboard::DateBounds,
            models::dashboard::DimensionTotal,
            models::dashboard::DailyPivot,
            models::dashboard::PivotRow,
            models::dashboard::DataTable,
            models::filter::FilterSelection,
            services::dashboard_service::DashboardSnapshot,
            handlers::dashboard::TotalsResponse,
            handlers::dashboard::DailyResponse,

            // --- INSIGHTS ---
            models::insights::InsightPayload,
            models::insights::InsightResponse,
        )
    ),
    tags(
        (name = "Dashboard", description = "Limites, marcas e agregados de pedidos"),
        (name = "Insights", description = "Narrativas geradas pelo modelo sobre os gráficos")
    )
)]
pub struct ApiDoc;

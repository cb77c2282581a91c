// src/handlers/dashboard.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::Query;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    common::error::AppError,
    config::AppState,
    models::{
        dashboard::{DailyPivot, DateBounds, DimensionTotal},
        filter::{FilterQuery, FilterSelection},
    },
    services::chart_service,
};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TotalsResponse {
    pub filter: FilterSelection,
    pub totals: Vec<DimensionTotal>,
    /// Figura plotly (data + layout) do gráfico de barras.
    #[schema(value_type = Object)]
    pub chart: serde_json::Value,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyResponse {
    pub filter: FilterSelection,
    pub pivot: DailyPivot,
    /// Figura plotly (data + layout) do gráfico de linhas.
    #[schema(value_type = Object)]
    pub chart: serde_json::Value,
}

// GET /api/health
pub async fn health(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    sqlx::query("SELECT 1").execute(&app_state.db_pool).await?;
    Ok("OK")
}

// GET /api/dashboard/bounds
#[utoipa::path(
    get,
    path = "/api/dashboard/bounds",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Menor e maior data disponíveis", body = DateBounds)
    )
)]
pub async fn get_date_bounds(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let bounds = app_state.dashboard_service.get_date_bounds().await?;
    Ok((StatusCode::OK, Json(bounds)))
}

// GET /api/dashboard/brands
#[utoipa::path(
    get,
    path = "/api/dashboard/brands",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Todas as marcas de food truck", body = Vec<String>)
    )
)]
pub async fn get_brands(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let brands = app_state.dashboard_service.get_brands().await?;
    Ok((StatusCode::OK, Json(brands)))
}

// GET /api/dashboard/totals
#[utoipa::path(
    get,
    path = "/api/dashboard/totals",
    tag = "Dashboard",
    params(FilterQuery),
    responses(
        (status = 200, description = "Pedidos por valor da dimensão + gráfico de barras", body = TotalsResponse),
        (status = 400, description = "Dimensão ou intervalo inválido")
    )
)]
pub async fn get_totals(
    State(app_state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Result<impl IntoResponse, AppError> {
    let service = &app_state.dashboard_service;
    let filter = service.resolve_filter(&query).await?;
    let totals = service.get_dimension_totals(&filter).await?;
    let chart = chart_service::to_json_value(&chart_service::bar_chart(filter.dimension, &totals))?;

    Ok((StatusCode::OK, Json(TotalsResponse { filter, totals, chart })))
}

// GET /api/dashboard/daily
#[utoipa::path(
    get,
    path = "/api/dashboard/daily",
    tag = "Dashboard",
    params(FilterQuery),
    responses(
        (status = 200, description = "Pivot diário por valor da dimensão + gráfico de linhas", body = DailyResponse),
        (status = 400, description = "Dimensão ou intervalo inválido")
    )
)]
pub async fn get_daily(
    State(app_state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Result<impl IntoResponse, AppError> {
    let service = &app_state.dashboard_service;
    let filter = service.resolve_filter(&query).await?;
    let pivot = service.get_daily_pivot(&filter).await?;
    let chart = chart_service::to_json_value(&chart_service::line_chart(&pivot))?;

    Ok((StatusCode::OK, Json(DailyResponse { filter, pivot, chart })))
}

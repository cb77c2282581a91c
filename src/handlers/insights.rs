// src/handlers/insights.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::Query;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::{
        filter::FilterQuery,
        insights::{InsightPayload, InsightResponse},
    },
};

// POST /api/insights
#[utoipa::path(
    post,
    path = "/api/insights",
    tag = "Insights",
    request_body = InsightPayload,
    responses(
        (status = 200, description = "Texto gerado pelo modelo", body = InsightResponse),
        (status = 400, description = "Pergunta ou tabela inválida"),
        (status = 502, description = "Falha no endpoint de completion")
    )
)]
pub async fn ask(
    State(app_state): State<AppState>,
    Json(payload): Json<InsightPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let insight = app_state
        .insight_service
        .get_data_insights(&payload.question, &payload.table)
        .await?;

    Ok((StatusCode::OK, Json(InsightResponse { insight, note: None })))
}

// POST /api/insights/totals
#[utoipa::path(
    post,
    path = "/api/insights/totals",
    tag = "Insights",
    params(FilterQuery),
    responses(
        (status = 200, description = "Insights sobre o gráfico de barras", body = InsightResponse),
        (status = 502, description = "Falha no endpoint de completion")
    )
)]
pub async fn totals_insight(
    State(app_state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Result<impl IntoResponse, AppError> {
    let dashboard = &app_state.dashboard_service;
    let filter = dashboard.resolve_filter(&query).await?;
    let totals = dashboard.get_dimension_totals(&filter).await?;

    let res = app_state
        .insight_service
        .totals_insight(filter.dimension, &totals)
        .await?;

    Ok((StatusCode::OK, Json(res)))
}

// POST /api/insights/daily
#[utoipa::path(
    post,
    path = "/api/insights/daily",
    tag = "Insights",
    params(FilterQuery),
    responses(
        (status = 200, description = "Insights sobre os dias mais recentes do gráfico de linhas", body = InsightResponse),
        (status = 502, description = "Falha no endpoint de completion")
    )
)]
pub async fn daily_insight(
    State(app_state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Result<impl IntoResponse, AppError> {
    let dashboard = &app_state.dashboard_service;
    let filter = dashboard.resolve_filter(&query).await?;
    let pivot = dashboard.get_daily_pivot(&filter).await?;

    let res = app_state
        .insight_service
        .daily_insight(filter.dimension, &pivot)
        .await?;

    Ok((StatusCode::OK, Json(res)))
}

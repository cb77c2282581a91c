// src/handlers/page.rs

use axum::{
    extract::State,
    response::Html,
};
use axum_extra::extract::Query;
use chrono::NaiveDate;
use minijinja::Environment;
use serde::{Deserialize, Serialize};

use crate::{
    common::error::AppError,
    config::AppState,
    models::{
        dashboard::{DateBounds, Dimension},
        filter::FilterQuery,
        insights::InsightResponse,
    },
    services::{chart_service, dashboard_service::DashboardSnapshot},
};

static DASHBOARD_TMPL: &str = include_str!("../templates/dashboard.html");

pub const PAGE_TITLE: &str = "Tasty Bytes Insights 🎈";

// Qual botão "Get Insights" foi apertado (se algum).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Totals,
    Daily,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageAction {
    pub insight: Option<InsightKind>,
}

#[derive(Debug, Serialize)]
struct SelectOption {
    value: String,
    label: String,
    selected: bool,
}

#[derive(Debug, Serialize)]
pub struct InsightPanel {
    pub title: String,
    pub note: Option<String>,
    pub text: String,
}

#[derive(Debug, Serialize)]
struct PageContext {
    title: &'static str,
    dimension_label: &'static str,
    dimensions: Vec<SelectOption>,
    brands: Vec<SelectOption>,
    start: NaiveDate,
    end: NaiveDate,
    min_date: NaiveDate,
    max_date: NaiveDate,
    totals_chart: String,
    daily_chart: String,
    totals_panel: Option<InsightPanel>,
    daily_panel: Option<InsightPanel>,
}

// GET /
// Cada interação refaz a passada inteira; os painéis só existem na resposta do clique.
pub async fn dashboard_page(
    State(app_state): State<AppState>,
    Query(query): Query<FilterQuery>,
    Query(action): Query<PageAction>,
) -> Result<Html<String>, AppError> {
    let dashboard = &app_state.dashboard_service;
    let snapshot = dashboard.snapshot(&query).await?;
    let bounds = dashboard.get_date_bounds().await?;
    let all_brands = dashboard.get_brands().await?;

    let dimension = snapshot.filter.dimension;
    let mut totals_panel = None;
    let mut daily_panel = None;

    match action.insight {
        Some(InsightKind::Totals) => {
            let res = app_state
                .insight_service
                .totals_insight(dimension, &snapshot.totals)
                .await?;
            totals_panel = Some(panel(panel_title(InsightKind::Totals, dimension), res));
        }
        Some(InsightKind::Daily) => {
            let res = app_state
                .insight_service
                .daily_insight(dimension, &snapshot.daily)
                .await?;
            daily_panel = Some(panel(panel_title(InsightKind::Daily, dimension), res));
        }
        None => {}
    }

    let html = render_page(&snapshot, &bounds, &all_brands, totals_panel, daily_panel)?;
    Ok(Html(html))
}

/// Cabeçalho do painel expandido: coluna no de totais, rótulo no diário.
pub fn panel_title(kind: InsightKind, dimension: Dimension) -> String {
    match kind {
        InsightKind::Totals => format!("{} Insights", dimension.column_name()),
        InsightKind::Daily => format!("{} Daily Insights", dimension.label()),
    }
}

fn panel(title: String, res: InsightResponse) -> InsightPanel {
    InsightPanel { title, note: res.note, text: res.insight }
}

pub fn render_page(
    snapshot: &DashboardSnapshot,
    bounds: &DateBounds,
    all_brands: &[String],
    totals_panel: Option<InsightPanel>,
    daily_panel: Option<InsightPanel>,
) -> Result<String, AppError> {
    let filter = &snapshot.filter;

    let dimensions = Dimension::ALL
        .into_iter()
        .map(|d| SelectOption {
            value: d.label().to_string(),
            label: d.label().to_string(),
            selected: d == filter.dimension,
        })
        .collect();

    let brands = all_brands
        .iter()
        .map(|b| SelectOption {
            value: b.clone(),
            label: b.clone(),
            selected: filter.brands.contains(b),
        })
        .collect();

    let ctx = PageContext {
        title: PAGE_TITLE,
        dimension_label: filter.dimension.label(),
        dimensions,
        brands,
        start: filter.start,
        end: filter.end,
        min_date: bounds.min_date,
        max_date: bounds.max_date,
        totals_chart: chart_service::to_inline_html(
            &chart_service::bar_chart(filter.dimension, &snapshot.totals),
            "totals-chart",
        ),
        daily_chart: chart_service::to_inline_html(
            &chart_service::line_chart(&snapshot.daily),
            "daily-chart",
        ),
        totals_panel,
        daily_panel,
    };

    let mut env = Environment::new();
    env.add_template("dashboard.html", DASHBOARD_TMPL)?;
    let html = env.get_template("dashboard.html")?.render(&ctx)?;
    Ok(html)
}

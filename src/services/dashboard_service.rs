// src/services/dashboard_service.rs

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use chrono::NaiveDate;
use serde::Serialize;
use tokio::sync::OnceCell;
use utoipa::ToSchema;

use crate::{
    common::error::AppError,
    db::DashboardRepository,
    models::{
        dashboard::{
            day_of_week_label, DailyCount, DailyPivot, DateBounds, DimensionTotal, PivotRow,
        },
        filter::{FilterQuery, FilterSelection},
    },
};

// Os dois lookups que não dependem do filtro: preenchidos uma vez por processo.
#[derive(Default)]
struct LookupCache {
    bounds: OnceCell<DateBounds>,
    brands: OnceCell<Vec<String>>,
}

/// Resultado de uma passada completa do pipeline para um filtro.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub filter: FilterSelection,
    pub totals: Vec<DimensionTotal>,
    pub daily: DailyPivot,
}

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
    cache: Arc<LookupCache>,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository) -> Self {
        Self { repo, cache: Arc::new(LookupCache::default()) }
    }

    pub async fn get_date_bounds(&self) -> Result<DateBounds, AppError> {
        let bounds = self
            .cache
            .bounds
            .get_or_try_init(|| async {
                let bounds = self.repo.get_date_bounds(self.repo.pool()).await?;
                tracing::info!(
                    "📅 Limites de data em cache: {} a {}",
                    bounds.min_date,
                    bounds.max_date
                );
                Ok::<_, AppError>(bounds)
            })
            .await?;
        Ok(*bounds)
    }

    pub async fn get_brands(&self) -> Result<Vec<String>, AppError> {
        let brands = self
            .cache
            .brands
            .get_or_try_init(|| async {
                let brands = self.repo.get_distinct_brands(self.repo.pool()).await?;
                tracing::info!("🚚 {} marcas em cache", brands.len());
                Ok::<_, AppError>(brands)
            })
            .await?;
        Ok(brands.clone())
    }

    /// Filter State: aplica os padrões e os limites do dataset ao que o usuário mandou.
    pub async fn resolve_filter(&self, query: &FilterQuery) -> Result<FilterSelection, AppError> {
        let bounds = self.get_date_bounds().await?;
        let brands = self.get_brands().await?;
        FilterSelection::resolve(query, &bounds, &brands)
    }

    pub async fn get_dimension_totals(
        &self,
        filter: &FilterSelection,
    ) -> Result<Vec<DimensionTotal>, AppError> {
        self.repo.get_dimension_totals(self.repo.pool(), filter).await
    }

    pub async fn get_daily_pivot(&self, filter: &FilterSelection) -> Result<DailyPivot, AppError> {
        let (_, pivot) = self.read_aggregates(filter, false).await?;
        Ok(pivot)
    }

    /// Uma passada inteira: filtro → consultas → resultados prontos para os gráficos.
    pub async fn snapshot(&self, query: &FilterQuery) -> Result<DashboardSnapshot, AppError> {
        let filter = self.resolve_filter(query).await?;
        let (totals, daily) = self.read_aggregates(&filter, true).await?;

        tracing::debug!(
            dimension = filter.dimension.column_name(),
            brands = filter.brands.len(),
            values = daily.columns.len(),
            "pipeline recalculado"
        );

        Ok(DashboardSnapshot { filter, totals, daily })
    }

    // Totais (opcionais), valores distintos e contagens diárias no mesmo snapshot do banco.
    async fn read_aggregates(
        &self,
        filter: &FilterSelection,
        with_totals: bool,
    ) -> Result<(Vec<DimensionTotal>, DailyPivot), AppError> {
        let mut tx = self.repo.begin_read_snapshot().await?;
        let totals = if with_totals {
            self.repo.get_dimension_totals(&mut *tx, filter).await?
        } else {
            Vec::new()
        };
        let values = self.repo.get_dimension_values(&mut *tx, filter).await?;
        let daily = self.repo.get_daily_counts(&mut *tx, filter).await?;
        tx.commit().await?;

        Ok((totals, pivot_daily_counts(&values, &daily)))
    }
}

/// Monta o pivot data × valor.
///
/// As colunas seguem a ordem de `values` (ordem de descoberta, sem ordenar) e
/// recebem o nome em maiúsculas. Um valor que só aparece em `daily` ganha coluna
/// nova no fim, na ordem em que aparece. Pares (data, valor) sem pedidos ficam `None`.
/// As linhas saem da data mais recente para a mais antiga.
pub fn pivot_daily_counts(values: &[String], daily: &[DailyCount]) -> DailyPivot {
    let mut columns: Vec<&str> = Vec::with_capacity(values.len());
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(values.len());
    let discovered = values.iter().map(String::as_str);
    for value in discovered.chain(daily.iter().map(|d| d.value.as_str())) {
        if !index.contains_key(value) {
            index.insert(value, columns.len());
            columns.push(value);
        }
    }

    let mut by_date: BTreeMap<NaiveDate, Vec<Option<i64>>> = BTreeMap::new();
    for entry in daily {
        let col = index[entry.value.as_str()];
        let cells = by_date
            .entry(entry.date)
            .or_insert_with(|| vec![None; columns.len()]);
        *cells[col].get_or_insert(0) += entry.count;
    }

    let rows = by_date
        .into_iter()
        .rev()
        .map(|(date, counts)| PivotRow {
            date,
            counts,
            day_of_week: day_of_week_label(date).to_string(),
        })
        .collect();

    DailyPivot {
        columns: columns.iter().map(|v| v.to_uppercase()).collect(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 1, d).unwrap()
    }

    fn count(d: u32, value: &str, count: i64) -> DailyCount {
        DailyCount { date: date(d), value: value.to_string(), count }
    }

    #[test]
    fn pivot_keeps_discovery_order_and_null_gaps() {
        let values = vec!["Male".to_string(), "Female".to_string(), "NULL".to_string()];
        let daily = vec![
            count(3, "Female", 2),
            count(3, "Male", 5),
            count(1, "NULL", 1),
            count(2, "Male", 4),
        ];

        let pivot = pivot_daily_counts(&values, &daily);

        assert_eq!(pivot.columns, vec!["MALE", "FEMALE", "NULL"]);
        let dates: Vec<_> = pivot.rows.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![date(3), date(2), date(1)]);
        assert_eq!(pivot.rows[0].counts, vec![Some(5), Some(2), None]);
        assert_eq!(pivot.rows[1].counts, vec![Some(4), None, None]);
        assert_eq!(pivot.rows[2].counts, vec![None, None, Some(1)]);
    }

    #[test]
    fn pivot_cells_sum_to_input_counts() {
        let values = vec!["Tokyo".to_string(), "Delhi".to_string()];
        let daily = vec![
            count(5, "Tokyo", 10),
            count(5, "Delhi", 7),
            count(6, "Tokyo", 3),
        ];
        let pivot = pivot_daily_counts(&values, &daily);
        let total: i64 = pivot
            .rows
            .iter()
            .flat_map(|r| r.counts.iter().flatten())
            .sum();
        assert_eq!(total, 20);
        assert_eq!(pivot.columns.len(), values.len());
    }

    #[test]
    fn values_missing_from_distinct_list_become_columns() {
        let values = vec!["Tokyo".to_string()];
        let daily = vec![
            count(4, "Tokyo", 2),
            count(4, "Seoul", 6),
            count(3, "Seoul", 1),
        ];
        let pivot = pivot_daily_counts(&values, &daily);

        assert_eq!(pivot.columns, vec!["TOKYO", "SEOUL"]);
        assert_eq!(pivot.rows[0].counts, vec![Some(2), Some(6)]);
        assert_eq!(pivot.rows[1].counts, vec![None, Some(1)]);
        let total: i64 = pivot.rows.iter().flat_map(|r| r.counts.iter().flatten()).sum();
        assert_eq!(total, 9);
    }

    #[test]
    fn day_of_week_is_attached_to_every_row() {
        let values = vec!["Male".to_string()];
        let daily = vec![count(2, "Male", 1), count(3, "Male", 1)];
        let pivot = pivot_daily_counts(&values, &daily);
        let labels: Vec<_> = pivot.rows.iter().map(|r| r.day_of_week.as_str()).collect();
        assert_eq!(labels, vec!["Monday", "Sunday"]);
    }

    #[test]
    fn empty_selection_gives_empty_pivot() {
        let pivot = pivot_daily_counts(&[], &[]);
        assert!(pivot.columns.is_empty());
        assert!(pivot.rows.is_empty());
    }
}

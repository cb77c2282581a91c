// src/models/dashboard.rs

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::common::error::AppError;

// Categoria usada quando a coluna da dimensão vem nula.
pub const NULL_CATEGORY: &str = "NULL";

const WEEKDAY_LABELS: [&str; 7] = [
    "Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday",
];

// --- DIMENSÕES ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Dimension {
    #[default]
    TruckBrandName,
    Region,
    Country,
    Gender,
    MaritalStatus,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::TruckBrandName,
        Dimension::Region,
        Dimension::Country,
        Dimension::Gender,
        Dimension::MaritalStatus,
    ];

    /// Rótulo exibido no seletor da página.
    pub fn label(self) -> &'static str {
        match self {
            Dimension::TruckBrandName => "Truck Brand Name",
            Dimension::Region => "Region",
            Dimension::Country => "Country",
            Dimension::Gender => "Gender",
            Dimension::MaritalStatus => "Marital Status",
        }
    }

    /// Identificador da coluna na view de pedidos.
    pub fn column_name(self) -> &'static str {
        match self {
            Dimension::TruckBrandName => "TRUCK_BRAND_NAME",
            Dimension::Region => "REGION",
            Dimension::Country => "COUNTRY",
            Dimension::Gender => "GENDER",
            Dimension::MaritalStatus => "MARITAL_STATUS",
        }
    }

    /// Aceita tanto o rótulo ("Marital Status") quanto a coluna ("MARITAL_STATUS").
    pub fn parse(input: &str) -> Result<Self, AppError> {
        let normalized = input.trim().to_uppercase().replace(' ', "_");
        Self::ALL
            .into_iter()
            .find(|d| d.column_name() == normalized)
            .ok_or_else(|| AppError::InvalidDimension(input.to_string()))
    }
}

// --- LOOKUPS (cacheados) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DateBounds {
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
}

impl DateBounds {
    pub fn clamp(&self, date: NaiveDate) -> NaiveDate {
        date.clamp(self.min_date, self.max_date)
    }
}

// --- AGREGADOS ---

// 1. Total de pedidos por valor da dimensão (gráfico de barras)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DimensionTotal {
    #[schema(example = "Guac n' Roll")]
    pub value: String,
    pub count: i64,
}

// 2. Contagem diária por valor da dimensão (linha crua antes do pivot)
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub value: String,
    pub count: i64,
}

// 3. Pivot diário: uma coluna por valor, datas em ordem decrescente
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyPivot {
    /// Valores da dimensão na ordem em que foram descobertos (em maiúsculas).
    pub columns: Vec<String>,
    pub rows: Vec<PivotRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PivotRow {
    pub date: NaiveDate,
    /// Uma célula por coluna; `None` quando não houve pedido naquele dia.
    pub counts: Vec<Option<i64>>,
    #[schema(example = "Monday")]
    pub day_of_week: String,
}

impl DailyPivot {
    /// Os `n` dias mais recentes (as linhas já vêm em ordem decrescente).
    pub fn most_recent(&self, n: usize) -> DailyPivot {
        DailyPivot {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }
}

pub fn day_of_week_label(date: NaiveDate) -> &'static str {
    WEEKDAY_LABELS[date.weekday().num_days_from_sunday() as usize]
}

// --- TABELA GENÉRICA (entrada do Insight Requester) ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DataTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl DataTable {
    pub fn from_totals(dimension: Dimension, totals: &[DimensionTotal]) -> Self {
        Self {
            columns: vec![dimension.column_name().to_string(), "COUNT".to_string()],
            rows: totals
                .iter()
                .map(|t| vec![t.value.clone(), t.count.to_string()])
                .collect(),
        }
    }

    pub fn from_pivot(pivot: &DailyPivot) -> Self {
        let mut columns = Vec::with_capacity(pivot.columns.len() + 2);
        columns.push("DATE".to_string());
        columns.extend(pivot.columns.iter().cloned());
        columns.push("Day of Week".to_string());

        let rows = pivot
            .rows
            .iter()
            .map(|row| {
                let mut cells = Vec::with_capacity(columns.len());
                cells.push(row.date.format("%Y-%m-%d").to_string());
                cells.extend(row.counts.iter().map(|c| match c {
                    Some(n) => n.to_string(),
                    None => "NaN".to_string(),
                }));
                cells.push(row.day_of_week.clone());
                cells
            })
            .collect();

        Self { columns, rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn labels_normalize_to_column_names() {
        assert_eq!(Dimension::parse("Marital Status").unwrap(), Dimension::MaritalStatus);
        assert_eq!(Dimension::parse("truck brand name").unwrap(), Dimension::TruckBrandName);
        assert_eq!(Dimension::parse("GENDER").unwrap(), Dimension::Gender);
        for d in Dimension::ALL {
            assert_eq!(Dimension::parse(d.label()).unwrap(), d);
        }
    }

    #[test]
    fn unknown_dimension_is_rejected() {
        assert!(matches!(
            Dimension::parse("Menu Item"),
            Err(AppError::InvalidDimension(s)) if s == "Menu Item"
        ));
    }

    #[test]
    fn weekday_labels_start_on_sunday() {
        // 2022-01-02 foi um domingo
        let expected = [
            "Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday",
        ];
        for (offset, label) in expected.iter().enumerate() {
            let d = date("2022-01-02") + chrono::Duration::days(offset as i64);
            assert_eq!(day_of_week_label(d), *label);
        }
        assert_eq!(day_of_week_label(date("2022-01-09")), "Sunday");
    }

    #[test]
    fn bounds_clamp_dates() {
        let bounds = DateBounds { min_date: date("2022-01-01"), max_date: date("2022-10-31") };
        assert_eq!(bounds.clamp(date("2021-11-01")), date("2022-01-01"));
        assert_eq!(bounds.clamp(date("2023-01-01")), date("2022-10-31"));
        assert_eq!(bounds.clamp(date("2022-05-05")), date("2022-05-05"));
    }

    #[test]
    fn pivot_table_keeps_null_cells_visible() {
        let pivot = DailyPivot {
            columns: vec!["MALE".into(), "FEMALE".into()],
            rows: vec![PivotRow {
                date: date("2022-01-03"),
                counts: vec![Some(4), None],
                day_of_week: "Monday".into(),
            }],
        };
        let table = DataTable::from_pivot(&pivot);
        assert_eq!(table.columns, vec!["DATE", "MALE", "FEMALE", "Day of Week"]);
        assert_eq!(table.rows, vec![vec!["2022-01-03", "4", "NaN", "Monday"]]);
    }
}

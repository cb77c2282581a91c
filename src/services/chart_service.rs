// src/services/chart_service.rs

use plotly::common::{Mode, Title};
use plotly::layout::{Axis, Layout};
use plotly::{Bar, Plot, Scatter};

use crate::common::error::AppError;
use crate::models::dashboard::{DailyPivot, Dimension, DimensionTotal};

/// Gráfico de barras: x = valor da dimensão, y = contagem.
pub fn bar_chart(dimension: Dimension, totals: &[DimensionTotal]) -> Plot {
    let x: Vec<String> = totals.iter().map(|t| t.value.clone()).collect();
    let y: Vec<i64> = totals.iter().map(|t| t.count).collect();

    let mut plot = Plot::new();
    plot.add_trace(Bar::new(x, y).name("COUNT"));
    plot.set_layout(
        Layout::new()
            .x_axis(Axis::new().title(Title::new(dimension.column_name())))
            .y_axis(Axis::new().title(Title::new("COUNT"))),
    );
    plot
}

/// Gráfico de linhas: x = data, uma série por coluna do pivot, na ordem das colunas.
///
/// Células `None` viram `null` no JSON e o plotly desenha um buraco na linha.
pub fn line_chart(pivot: &DailyPivot) -> Plot {
    let dates: Vec<String> = pivot
        .rows
        .iter()
        .map(|r| r.date.format("%Y-%m-%d").to_string())
        .collect();

    let mut plot = Plot::new();
    for (col, name) in pivot.columns.iter().enumerate() {
        let y: Vec<Option<i64>> = pivot
            .rows
            .iter()
            .map(|r| r.counts.get(col).copied().flatten())
            .collect();
        plot.add_trace(
            Scatter::new(dates.clone(), y)
                .mode(Mode::Lines)
                .name(name),
        );
    }
    plot.set_layout(
        Layout::new()
            .x_axis(Axis::new().title(Title::new("DATE")))
            .y_axis(Axis::new().title(Title::new("COUNT"))),
    );
    plot
}

/// Trecho HTML com o `div` do gráfico; a página carrega o plotly.js.
pub fn to_inline_html(plot: &Plot, div_id: &str) -> String {
    plot.to_inline_html(Some(div_id))
}

/// O mesmo gráfico como JSON, para quem consome a API.
pub fn to_json_value(plot: &Plot) -> Result<serde_json::Value, AppError> {
    Ok(serde_json::from_str(&plot.to_json())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dashboard::PivotRow;
    use chrono::NaiveDate;

    #[test]
    fn bar_chart_has_one_bar_per_value() {
        let totals = vec![
            DimensionTotal { value: "Male".into(), count: 12 },
            DimensionTotal { value: "Female".into(), count: 9 },
            DimensionTotal { value: "NULL".into(), count: 1 },
        ];
        let json = to_json_value(&bar_chart(Dimension::Gender, &totals)).unwrap();
        let trace = &json["data"][0];
        assert_eq!(trace["type"], "bar");
        assert_eq!(trace["x"], serde_json::json!(["Male", "Female", "NULL"]));
        assert_eq!(trace["y"], serde_json::json!([12, 9, 1]));
    }

    #[test]
    fn line_chart_series_follow_column_order() {
        let pivot = DailyPivot {
            columns: vec!["TOKYO".into(), "DELHI".into()],
            rows: vec![
                PivotRow {
                    date: NaiveDate::from_ymd_opt(2022, 1, 2).unwrap(),
                    counts: vec![Some(3), None],
                    day_of_week: "Sunday".into(),
                },
                PivotRow {
                    date: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
                    counts: vec![Some(1), Some(2)],
                    day_of_week: "Saturday".into(),
                },
            ],
        };
        let json = to_json_value(&line_chart(&pivot)).unwrap();
        let data = json["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["name"], "TOKYO");
        assert_eq!(data[1]["name"], "DELHI");
        assert_eq!(data[1]["y"], serde_json::json!([null, 2]));
        assert_eq!(data[0]["x"], serde_json::json!(["2022-01-02", "2022-01-01"]));
    }

    #[test]
    fn empty_inputs_render_empty_charts() {
        let bar = to_json_value(&bar_chart(Dimension::Region, &[])).unwrap();
        assert_eq!(bar["data"][0]["x"], serde_json::json!([]));

        let line = to_json_value(&line_chart(&DailyPivot::default())).unwrap();
        assert!(line["data"].as_array().map_or(true, |d| d.is_empty()));

        let html = to_inline_html(&line_chart(&DailyPivot::default()), "daily-chart");
        assert!(html.contains("daily-chart"));
    }
}

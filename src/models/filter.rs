// src/models/filter.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    common::error::AppError,
    models::dashboard::{DateBounds, Dimension},
};

// O que chega da página / da API. Tudo opcional: o que faltar vem dos padrões.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FilterQuery {
    /// Rótulo ou coluna da dimensão ("Marital Status" ou "MARITAL_STATUS").
    #[param(example = "Gender")]
    pub dimension: Option<String>,

    #[param(value_type = Option<String>, example = "2022-01-01")]
    pub start: Option<NaiveDate>,

    #[param(value_type = Option<String>, example = "2022-01-07")]
    pub end: Option<NaiveDate>,

    /// Marcas selecionadas (repita o parâmetro: `brands=a&brands=b`).
    #[serde(default)]
    pub brands: Vec<String>,

    /// Quando `true`, `brands` vale exatamente como veio, mesmo vazia.
    #[serde(default)]
    pub explicit: bool,
}

// A seleção já resolvida, pronta para o Query Layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilterSelection {
    pub dimension: Dimension,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub brands: Vec<String>,
}

// Janela padrão do slider de datas
pub fn default_window() -> (NaiveDate, NaiveDate) {
    (
        NaiveDate::from_ymd_opt(2021, 11, 1).unwrap_or(NaiveDate::MIN),
        NaiveDate::from_ymd_opt(2022, 10, 31).unwrap_or(NaiveDate::MAX),
    )
}

impl FilterSelection {
    /// Aplica os padrões da página sobre o que o usuário mandou.
    ///
    /// As datas são presas aos limites do dataset, como no slider.
    /// Uma seleção vazia de marcas só é respeitada quando `explicit` vem marcado;
    /// caso contrário o usuário nunca mexeu no controle e recebe todas as marcas.
    pub fn resolve(
        query: &FilterQuery,
        bounds: &DateBounds,
        all_brands: &[String],
    ) -> Result<Self, AppError> {
        let dimension = match query.dimension.as_deref() {
            Some(raw) if !raw.trim().is_empty() => Dimension::parse(raw)?,
            _ => Dimension::default(),
        };

        let (default_start, default_end) = default_window();
        let start = bounds.clamp(query.start.unwrap_or(default_start));
        let end = bounds.clamp(query.end.unwrap_or(default_end));
        if start > end {
            return Err(AppError::InvalidDateRange);
        }

        let brands = if query.brands.is_empty() && !query.explicit {
            all_brands.to_vec()
        } else {
            query.brands.clone()
        };

        Ok(Self { dimension, start, end, brands })
    }
}

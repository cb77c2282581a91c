// src/models/insights.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::dashboard::DataTable;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsightPayload {
    #[validate(length(min = 1, message = "A pergunta não pode ser vazia"))]
    #[schema(example = "Here are sales by REGION. What are some insights from this data?")]
    pub question: String,

    #[validate(custom(function = "validate_table"))]
    pub table: DataTable,
}

fn validate_table(table: &DataTable) -> Result<(), validator::ValidationError> {
    if table.columns.is_empty() {
        let mut err = validator::ValidationError::new("columns");
        err.message = Some("A tabela precisa de pelo menos uma coluna".into());
        return Err(err);
    }
    if table.rows.iter().any(|row| row.len() != table.columns.len()) {
        let mut err = validator::ValidationError::new("rows");
        err.message = Some("Toda linha precisa ter o mesmo número de colunas do cabeçalho".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsightResponse {
    /// Texto livre devolvido pelo modelo.
    pub insight: String,

    /// Aviso exibido junto do painel (ex.: truncamento da tabela diária).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

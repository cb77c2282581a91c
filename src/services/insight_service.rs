// src/services/insight_service.rs

use std::sync::Arc;

use tabled::{builder::Builder, settings::Style};

use crate::{
    common::error::AppError,
    models::{
        dashboard::{DailyPivot, DataTable, Dimension, DimensionTotal},
        insights::InsightResponse,
    },
    services::completion_client::CompletionClient,
};

pub const DEFAULT_MODEL: &str = "llama2-70b-chat";
pub const DEFAULT_DAILY_ROWS: usize = 15;

// Separa as instruções dos dados dentro do prompt.
const DATA_DELIMITER: &str = "###";

const PROMPT_PREFIX: &str = "You are an assistant helping derive insights from a dataset containing order information from a global \
network of food trucks. I will provide you with a question and a dataset, and you will respond \
in a concise way that answers the question. Provide answers based only on the provided data. \
Respond with a playful tone, incorporating food puns into the body of the response. Limit your response to 500 words.";

#[derive(Clone)]
pub struct InsightService {
    client: Arc<dyn CompletionClient>,
    model: String,
    daily_rows: usize,
}

impl InsightService {
    pub fn new(client: Arc<dyn CompletionClient>, model: impl Into<String>, daily_rows: usize) -> Self {
        Self { client, model: model.into(), daily_rows }
    }

    /// Serializa a tabela, monta o prompt e devolve o texto do modelo.
    /// Qualquer falha do endpoint sobe direto, sem retry.
    pub async fn get_data_insights(&self, question: &str, table: &DataTable) -> Result<String, AppError> {
        let prompt = build_prompt(question, &serialize_table(table));

        tracing::info!(
            model = %self.model,
            rows = table.rows.len(),
            prompt_chars = prompt.len(),
            "🤖 Pedindo insights ao modelo"
        );

        self.client.complete(&self.model, &prompt).await
    }

    // Insights do gráfico de barras: a tabela vai inteira.
    pub async fn totals_insight(
        &self,
        dimension: Dimension,
        totals: &[DimensionTotal],
    ) -> Result<InsightResponse, AppError> {
        let question = format!(
            "Here are sales by {}. What are some insights from this data?",
            dimension.column_name()
        );
        let table = DataTable::from_totals(dimension, totals);
        let insight = self.get_data_insights(&question, &table).await?;

        Ok(InsightResponse { insight, note: None })
    }

    // Insights diários: só os dias mais recentes, para segurar o tamanho do prompt.
    pub async fn daily_insight(
        &self,
        dimension: Dimension,
        pivot: &DailyPivot,
    ) -> Result<InsightResponse, AppError> {
        let label = dimension.label();
        let question = format!(
            "Here are sales by {label} by day. What {label}s are trending upward? \
             Are there any days of the week where {label}s overperform or underperform?"
        );
        let table = DataTable::from_pivot(&pivot.most_recent(self.daily_rows));
        let insight = self.get_data_insights(&question, &table).await?;

        Ok(InsightResponse {
            insight,
            note: Some(format!(
                "Insights limited to the last {} days to limit prompt size",
                self.daily_rows
            )),
        })
    }
}

/// Tabela em texto puro: cabeçalho + uma linha por registro, sem coluna de índice.
pub fn serialize_table(table: &DataTable) -> String {
    let mut builder = Builder::default();
    builder.push_record(table.columns.iter().map(|c| strip_delimiter(c)));
    for row in &table.rows {
        builder.push_record(row.iter().map(|cell| strip_delimiter(cell)));
    }

    let mut rendered = builder.build();
    rendered.with(Style::blank());
    rendered.to_string()
}

pub fn build_prompt(question: &str, data: &str) -> String {
    let question = strip_delimiter(question);
    format!("{PROMPT_PREFIX}\n\n{question}\n{DATA_DELIMITER}\n{data}\n{DATA_DELIMITER}")
}

// O prompt tem exatamente dois delimitadores; texto vindo de fora não pode trazer outro.
fn strip_delimiter(text: &str) -> String {
    text.replace(DATA_DELIMITER, "")
}

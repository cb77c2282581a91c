// src/services/completion_client.rs

use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;

use crate::common::error::AppError;

// Quem sabe transformar (modelo, prompt) em texto.
#[async_trait::async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, model: &str, prompt: &str) -> Result<String, AppError>;
}

// =========================================================================
//  WAREHOUSE: a função de completion mora no próprio banco
// =========================================================================

pub struct WarehouseCompletion {
    pool: PgPool,
    function: String,
}

impl WarehouseCompletion {
    /// `function` já vem validado (identificador qualificado, ex.: `snowflake.cortex.complete`).
    pub fn new(pool: PgPool, function: impl Into<String>) -> Self {
        Self { pool, function: function.into() }
    }

    fn sql(&self) -> String {
        format!("SELECT {}($1, $2) AS insight", self.function)
    }
}

#[async_trait::async_trait]
impl CompletionClient for WarehouseCompletion {
    async fn complete(&self, model: &str, prompt: &str) -> Result<String, AppError> {
        // Modelo e prompt vão como parâmetros: a tabela embutida não precisa de escape.
        let sql = self.sql();
        let insight: Option<String> = sqlx::query_scalar(&sql)
            .bind(model)
            .bind(prompt)
            .fetch_one(&self.pool)
            .await?;

        insight.ok_or(AppError::EmptyCompletion)
    }
}

// =========================================================================
//  HTTP: endpoint hospedado no estilo /completions
// =========================================================================

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    text: Option<String>,
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl CompletionResponse {
    fn into_text(self) -> Option<String> {
        let first = self.choices.into_iter().next()?;
        first.text.or_else(|| first.message.and_then(|m| m.content))
    }
}

pub struct HttpCompletion {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl HttpCompletion {
    pub fn new(url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            api_key,
        }
    }
}

#[async_trait::async_trait]
impl CompletionClient for HttpCompletion {
    async fn complete(&self, model: &str, prompt: &str) -> Result<String, AppError> {
        let payload = json!({
            "model": model,
            "prompt": prompt,
            "stream": false,
        });

        let mut request = self.client.post(&self.url).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let res = request.send().await?;
        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::CompletionStatus { status, body });
        }

        res.json::<CompletionResponse>()
            .await?
            .into_text()
            .ok_or(AppError::EmptyCompletion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_text_from_first_choice() {
        let body = r#"{"choices":[{"text":"Taco Tuesday wins"},{"text":"ignored"}]}"#;
        let res: CompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(res.into_text().as_deref(), Some("Taco Tuesday wins"));
    }

    #[test]
    fn falls_back_to_chat_message_content() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"Ramen rules"}}]}"#;
        let res: CompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(res.into_text().as_deref(), Some("Ramen rules"));
    }

    #[test]
    fn no_choices_means_no_text() {
        let res: CompletionResponse = serde_json::from_str("{}").unwrap();
        assert!(res.into_text().is_none());
    }

    #[tokio::test]
    async fn warehouse_sql_takes_model_and_prompt_as_params() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/tasty")
            .unwrap();
        let client = WarehouseCompletion::new(pool, "snowflake.cortex.complete");
        assert_eq!(client.sql(), "SELECT snowflake.cortex.complete($1, $2) AS insight");
    }
}

// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Todos os erros do dashboard passam por aqui e viram resposta HTTP.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Dimensão de análise desconhecida: {0}")]
    InvalidDimension(String),

    #[error("Intervalo de datas inválido: início depois do fim")]
    InvalidDateRange,

    #[error("A view de pedidos não tem nenhuma data")]
    EmptyDataset,

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Falha na chamada ao modelo: {0}")]
    CompletionRequest(#[from] reqwest::Error),

    #[error("O modelo respondeu {status}: {body}")]
    CompletionStatus { status: u16, body: String },

    #[error("O modelo não devolveu nenhum texto")]
    EmptyCompletion,

    #[error("Erro ao renderizar a página: {0}")]
    TemplateError(#[from] minijinja::Error),

    #[error("Erro ao serializar o gráfico: {0}")]
    ChartSerialization(#[from] serde_json::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidDimension(_)
            | AppError::InvalidDateRange => StatusCode::BAD_REQUEST,
            AppError::CompletionRequest(_)
            | AppError::CompletionStatus { .. }
            | AppError::EmptyCompletion => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match self {
            // Devolve todos os detalhes da validação.
            AppError::ValidationError(ref errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors.iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                })
            }
            ref e if status.is_client_error() => json!({ "error": e.to_string() }),

            // Falhas do warehouse e do modelo abortam a interação; o detalhe vai pro log.
            ref e => {
                tracing::error!("🔥 Falha ao processar a interação: {}", e);
                json!({ "error": e.to_string() })
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_bad_request() {
        assert_eq!(AppError::InvalidDateRange.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::InvalidDimension("Flavor".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn completion_errors_map_to_bad_gateway() {
        let err = AppError::CompletionStatus { status: 503, body: "busy".into() };
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(AppError::EmptyCompletion.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn warehouse_errors_are_internal() {
        let err = AppError::DatabaseError(sqlx::Error::RowNotFound);
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn chart_serialization_errors_are_internal() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = AppError::from(json_err);
        assert!(matches!(err, AppError::ChartSerialization(_)));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

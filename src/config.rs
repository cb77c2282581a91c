// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use validator::{Validate, ValidationError};

use crate::{
    db::DashboardRepository,
    services::{
        completion_client::{CompletionClient, HttpCompletion, WarehouseCompletion},
        dashboard_service::DashboardService,
        insight_service::{InsightService, DEFAULT_DAILY_ROWS, DEFAULT_MODEL},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionBackend {
    Warehouse,
    Http,
}

impl std::str::FromStr for CompletionBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "warehouse" => Ok(Self::Warehouse),
            "http" => Ok(Self::Http),
            other => anyhow::bail!("COMPLETION_BACKEND desconhecido: {other} (use 'warehouse' ou 'http')"),
        }
    }
}

// Tudo o que vem do ambiente, validado antes de abrir qualquer conexão.
#[derive(Debug, Clone, Validate)]
pub struct Settings {
    pub database_url: String,

    #[validate(custom(function = "validate_identifier"))]
    pub orders_view: String,

    pub bind_addr: String,

    #[validate(range(min = 1, max = 100))]
    pub db_max_connections: u32,

    pub completion_backend: CompletionBackend,

    #[validate(length(min = 1))]
    pub completion_model: String,

    #[validate(custom(function = "validate_identifier"))]
    pub completion_function: String,

    #[validate(url)]
    pub completion_url: Option<String>,

    pub completion_api_key: Option<String>,

    // Teto do prompt diário: dá para reduzir, nunca passar de 15 dias.
    #[validate(range(min = 1, max = 15))]
    pub daily_insight_rows: usize,
}

/// Nome (opcionalmente qualificado) que vai direto no SQL: só letras, dígitos, `_` e `.`.
fn validate_identifier(value: &str) -> Result<(), ValidationError> {
    let ok = !value.is_empty()
        && value.split('.').all(|part| {
            let mut chars = part.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        });
    if ok {
        Ok(())
    } else {
        let mut err = ValidationError::new("identifier");
        err.message = Some("Use apenas letras, dígitos, '_' e '.'".into());
        Err(err)
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn optional_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let settings = Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?,
            orders_view: var_or("ORDERS_VIEW", "orders_v"),
            bind_addr: var_or("BIND_ADDR", "0.0.0.0:3000"),
            db_max_connections: var_or("DB_MAX_CONNECTIONS", "5")
                .parse()
                .context("DB_MAX_CONNECTIONS precisa ser um número")?,
            completion_backend: var_or("COMPLETION_BACKEND", "warehouse").parse()?,
            completion_model: var_or("COMPLETION_MODEL", DEFAULT_MODEL),
            completion_function: var_or("COMPLETION_FUNCTION", "snowflake.cortex.complete"),
            completion_url: optional_var("COMPLETION_URL"),
            completion_api_key: optional_var("COMPLETION_API_KEY"),
            daily_insight_rows: var_or("DAILY_INSIGHT_ROWS", &DEFAULT_DAILY_ROWS.to_string())
                .parse()
                .context("DAILY_INSIGHT_ROWS precisa ser um número")?,
        };

        settings.check()?;
        Ok(settings)
    }

    fn check(&self) -> anyhow::Result<()> {
        self.validate().context("Configuração inválida")?;
        if self.completion_backend == CompletionBackend::Http && self.completion_url.is_none() {
            anyhow::bail!("COMPLETION_URL é obrigatória quando COMPLETION_BACKEND=http");
        }
        Ok(())
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub dashboard_service: DashboardService,
    pub insight_service: InsightService,
}

impl AppState {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        // Conecta ao warehouse, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(settings.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&settings.database_url)
            .await
            .context("Falha ao conectar ao warehouse")?;

        tracing::info!("✅ Conexão com o warehouse estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let dashboard_repo = DashboardRepository::new(db_pool.clone(), settings.orders_view.clone());
        let dashboard_service = DashboardService::new(dashboard_repo);

        let completion: Arc<dyn CompletionClient> = match settings.completion_backend {
            CompletionBackend::Warehouse => Arc::new(WarehouseCompletion::new(
                db_pool.clone(),
                settings.completion_function.clone(),
            )),
            CompletionBackend::Http => Arc::new(HttpCompletion::new(
                settings.completion_url.clone().unwrap_or_default(),
                settings.completion_api_key.clone(),
            )),
        };
        tracing::info!(
            "🤖 Completion via {:?} com o modelo {}",
            settings.completion_backend,
            settings.completion_model
        );

        let insight_service = InsightService::new(
            completion,
            settings.completion_model.clone(),
            settings.daily_insight_rows,
        );

        Ok(Self {
            db_pool,
            dashboard_service,
            insight_service,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            database_url: "postgres://localhost/tasty".into(),
            orders_view: "orders_v".into(),
            bind_addr: "127.0.0.1:3000".into(),
            db_max_connections: 5,
            completion_backend: CompletionBackend::Warehouse,
            completion_model: DEFAULT_MODEL.into(),
            completion_function: "snowflake.cortex.complete".into(),
            completion_url: None,
            completion_api_key: None,
            daily_insight_rows: DEFAULT_DAILY_ROWS,
        }
    }

    #[test]
    fn defaults_pass_validation() {
        assert!(settings().check().is_ok());
    }

    #[test]
    fn view_name_must_be_an_identifier() {
        let bad = Settings { orders_view: "orders_v; DROP TABLE x".into(), ..settings() };
        assert!(bad.check().is_err());

        let qualified = Settings { orders_view: "analytics.orders_v".into(), ..settings() };
        assert!(qualified.check().is_ok());
    }

    #[test]
    fn daily_rows_above_fifteen_are_rejected() {
        assert!(Settings { daily_insight_rows: 16, ..settings() }.check().is_err());
        assert!(Settings { daily_insight_rows: 0, ..settings() }.check().is_err());
        assert!(Settings { daily_insight_rows: 15, ..settings() }.check().is_ok());
        assert!(Settings { daily_insight_rows: 7, ..settings() }.check().is_ok());
    }

    #[test]
    fn http_backend_requires_url() {
        let http = Settings { completion_backend: CompletionBackend::Http, ..settings() };
        assert!(http.check().is_err());

        let with_url = Settings {
            completion_url: Some("https://llm.example.com/v1/completions".into()),
            ..http
        };
        assert!(with_url.check().is_ok());
    }

    #[test]
    fn backend_names_parse() {
        assert_eq!("HTTP".parse::<CompletionBackend>().unwrap(), CompletionBackend::Http);
        assert_eq!("warehouse".parse::<CompletionBackend>().unwrap(), CompletionBackend::Warehouse);
        assert!("grpc".parse::<CompletionBackend>().is_err());
    }
}

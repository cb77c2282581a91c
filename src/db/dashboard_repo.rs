// src/db/dashboard_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, FromRow, PgPool, Postgres, QueryBuilder, Transaction};

use crate::{
    common::error::AppError,
    models::{
        dashboard::{DailyCount, DateBounds, Dimension, DimensionTotal, NULL_CATEGORY},
        filter::FilterSelection,
    },
};

// Primeiro comando da transação: todas as consultas enxergam o mesmo snapshot.
const READ_SNAPSHOT_SQL: &str = "SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY";

#[derive(FromRow)]
struct BoundsRow {
    min_date: Option<NaiveDate>,
    max_date: Option<NaiveDate>,
}

// Todas as consultas rodam na view de pedidos; nada aqui escreve no warehouse.
#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
    orders_view: String,
}

impl DashboardRepository {
    /// `orders_view` já vem validado como identificador pelo `Settings`.
    pub fn new(pool: PgPool, orders_view: impl Into<String>) -> Self {
        Self { pool, orders_view: orders_view.into() }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Transação somente leitura em REPEATABLE READ para as consultas de um mesmo request.
    pub async fn begin_read_snapshot(&self) -> Result<Transaction<'static, Postgres>, AppError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(READ_SNAPSHOT_SQL).execute(&mut *tx).await?;
        Ok(tx)
    }

    // 1. Menor e maior data do dataset inteiro
    pub async fn get_date_bounds<'e, E>(&self, executor: E) -> Result<DateBounds, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT MIN(DATE) AS min_date, MAX(DATE) AS max_date FROM ",
        );
        qb.push(&self.orders_view);

        let row = qb.build_query_as::<BoundsRow>().fetch_one(executor).await?;

        match (row.min_date, row.max_date) {
            (Some(min_date), Some(max_date)) => Ok(DateBounds { min_date, max_date }),
            _ => Err(AppError::EmptyDataset),
        }
    }

    // 2. Lista de marcas (sem ordenação: a ordem é a que o warehouse devolver)
    pub async fn get_distinct_brands<'e, E>(&self, executor: E) -> Result<Vec<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT DISTINCT TRUCK_BRAND_NAME FROM ");
        qb.push(&self.orders_view);
        qb.push(" WHERE TRUCK_BRAND_NAME IS NOT NULL");

        let brands = qb
            .build_query_scalar::<String>()
            .fetch_all(executor)
            .await?;

        Ok(brands)
    }

    // 3. Total de pedidos por valor da dimensão
    pub async fn get_dimension_totals<'e, E>(
        &self,
        executor: E,
        filter: &FilterSelection,
    ) -> Result<Vec<DimensionTotal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        push_coalesced_dimension(&mut qb, filter.dimension);
        qb.push(" AS value, COUNT(*) AS count");
        self.push_base_filter(&mut qb, filter);
        qb.push(" GROUP BY 1");

        let totals = qb
            .build_query_as::<DimensionTotal>()
            .fetch_all(executor)
            .await?;

        Ok(totals)
    }

    // 4. Valores distintos da dimensão dentro do filtro (viram as colunas do pivot)
    pub async fn get_dimension_values<'e, E>(
        &self,
        executor: E,
        filter: &FilterSelection,
    ) -> Result<Vec<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT DISTINCT ");
        push_coalesced_dimension(&mut qb, filter.dimension);
        qb.push(" AS value");
        self.push_base_filter(&mut qb, filter);

        let values = qb
            .build_query_scalar::<String>()
            .fetch_all(executor)
            .await?;

        Ok(values)
    }

    // 5. Contagem diária por valor, mais recente primeiro
    pub async fn get_daily_counts<'e, E>(
        &self,
        executor: E,
        filter: &FilterSelection,
    ) -> Result<Vec<DailyCount>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT DATE AS date, ");
        push_coalesced_dimension(&mut qb, filter.dimension);
        qb.push(" AS value, COUNT(*) AS count");
        self.push_base_filter(&mut qb, filter);
        qb.push(" GROUP BY 1, 2 ORDER BY 1 DESC");

        let rows = qb
            .build_query_as::<DailyCount>()
            .fetch_all(executor)
            .await?;

        Ok(rows)
    }

    /// `FROM <view> WHERE DATE BETWEEN .. AND TRUCK_BRAND_NAME = ANY(..)`
    ///
    /// Um array vazio não casa com nenhuma linha, então zero marcas = dataset vazio.
    fn push_base_filter(&self, qb: &mut QueryBuilder<'_, Postgres>, filter: &FilterSelection) {
        qb.push(" FROM ");
        qb.push(&self.orders_view);
        qb.push(" WHERE DATE >= ");
        qb.push_bind(filter.start);
        qb.push(" AND DATE <= ");
        qb.push_bind(filter.end);
        qb.push(" AND TRUCK_BRAND_NAME = ANY(");
        qb.push_bind(filter.brands.clone());
        qb.push(")");
    }
}

// A coluna vem de um enum fechado, então pode ir direto no SQL.
fn push_coalesced_dimension(qb: &mut QueryBuilder<'_, Postgres>, dimension: Dimension) {
    qb.push("COALESCE(CAST(");
    qb.push(dimension.column_name());
    qb.push(" AS TEXT), '");
    qb.push(NULL_CATEGORY);
    qb.push("')");
}

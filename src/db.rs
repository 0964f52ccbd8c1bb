use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{InputSnapshot, ReportSnapshot};

/// Where raw inputs and computed reports are kept as documents.
pub trait DocumentStore {
    async fn store_input(&self, snapshot: &InputSnapshot) -> Result<Uuid>;

    async fn store_report(&self, snapshot: &ReportSnapshot) -> Result<Uuid>;
}

pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect(database_url)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}

impl DocumentStore for PgDocumentStore {
    async fn store_input(&self, snapshot: &InputSnapshot) -> Result<Uuid> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO signup_summary.inputs (id, kind, document)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(id)
        .bind(snapshot.kind.as_str())
        .bind(Json(snapshot))
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    async fn store_report(&self, snapshot: &ReportSnapshot) -> Result<Uuid> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO signup_summary.results (id, kind, input_id, document)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(id)
        .bind(snapshot.kind.as_str())
        .bind(snapshot.input_id)
        .bind(Json(snapshot))
        .execute(&self.pool)
        .await?;

        Ok(id)
    }
}

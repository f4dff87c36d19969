use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use uuid::Uuid;

use crate::config::Settings;
use crate::models::{Company, CompanyChanges, CompanyType, NewCompany, User};
use crate::utils::{retry_with_backoff, RetryConfig, RetryResult};
use super::{CompanyRepository, StoreError, UserRepository};

// ============================================================================
// Postgres Adapter (sqlx)
// ============================================================================

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        username      TEXT PRIMARY KEY,
        password_hash TEXT NOT NULL,
        created_at    TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS companies (
        id          UUID PRIMARY KEY,
        name        VARCHAR(15) NOT NULL,
        description VARCHAR(3000) NOT NULL DEFAULT '',
        employees   INTEGER NOT NULL,
        registered  BOOLEAN NOT NULL,
        type        TEXT NOT NULL CHECK (type IN ('Corporations', 'NonProfit', 'Cooperative', 'Sole Proprietorship')),
        created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
        deleted_at  TIMESTAMPTZ
    )",
    "CREATE UNIQUE INDEX IF NOT EXISTS companies_live_name_idx
        ON companies (name) WHERE deleted_at IS NULL",
    "CREATE INDEX IF NOT EXISTS companies_deleted_at_idx ON companies (deleted_at)",
];

const COMPANY_COLUMNS: &str =
    "id, name, description, employees, registered, type, created_at, updated_at, deleted_at";

/// Open the pool, retrying with backoff while the database comes up.
pub async fn connect(settings: &Settings) -> anyhow::Result<PgPool> {
    let options = settings.connect_options();
    let max_connections = settings.db_max_connections;

    let result = retry_with_backoff(RetryConfig::default(), |attempt| {
        let options = options.clone();
        async move {
            tracing::info!(attempt, "Connecting to Postgres...");
            PgPoolOptions::new()
                .max_connections(max_connections)
                .connect_with(options)
                .await
        }
    })
    .await;

    match result {
        RetryResult::Success(pool) => Ok(pool),
        RetryResult::Failed(e) => {
            Err(anyhow::anyhow!("failed to connect to database: {e}"))
        }
    }
}

/// Create tables and indexes if they are missing. Safe on every boot.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::debug!("Schema is up to date");
    Ok(())
}

#[derive(sqlx::FromRow)]
struct CompanyRow {
    id: Uuid,
    name: String,
    description: String,
    employees: i32,
    registered: bool,
    #[sqlx(rename = "type")]
    company_type: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<CompanyRow> for Company {
    type Error = StoreError;

    fn try_from(row: CompanyRow) -> Result<Self, Self::Error> {
        let company_type = row
            .company_type
            .parse::<CompanyType>()
            .map_err(|e| StoreError::InvalidData(e.to_string()))?;

        Ok(Company {
            id: row.id,
            name: row.name,
            description: row.description,
            employees: row.employees,
            registered: row.registered,
            company_type,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}

pub struct PgCompanyRepository {
    pool: PgPool,
}

impl PgCompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CompanyRepository for PgCompanyRepository {
    async fn insert(&self, company: NewCompany) -> Result<Company, StoreError> {
        let row: CompanyRow = sqlx::query_as(&format!(
            "INSERT INTO companies (id, name, description, employees, registered, type)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COMPANY_COLUMNS}"
        ))
        .bind(company.id)
        .bind(&company.name)
        .bind(&company.description)
        .bind(company.employees)
        .bind(company.registered)
        .bind(company.company_type.as_str())
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn find(&self, id: Uuid) -> Result<Option<Company>, StoreError> {
        let row: Option<CompanyRow> = sqlx::query_as(&format!(
            "SELECT {COMPANY_COLUMNS} FROM companies WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Company::try_from).transpose()
    }

    async fn exists(&self, id: Uuid) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM companies WHERE id = $1 AND deleted_at IS NULL)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn name_exists(&self, name: &str) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM companies WHERE name = $1 AND deleted_at IS NULL)",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn update(&self, id: Uuid, changes: &CompanyChanges) -> Result<Company, StoreError> {
        let row: Option<CompanyRow> = sqlx::query_as(&format!(
            "UPDATE companies SET
                name        = COALESCE($2, name),
                description = COALESCE($3, description),
                employees   = COALESCE($4, employees),
                registered  = COALESCE($5, registered),
                type        = COALESCE($6, type),
                updated_at  = now()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COMPANY_COLUMNS}"
        ))
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.employees)
        .bind(changes.registered)
        .bind(changes.company_type.map(|t| t.as_str()))
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(StoreError::NotFound)?.try_into()
    }

    async fn soft_delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE companies SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let row: Option<(String, String)> =
            sqlx::query_as("SELECT username, password_hash FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(username, password_hash)| User { username, password_hash }))
    }

    async fn create_if_absent(&self, user: User) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "INSERT INTO users (username, password_hash) VALUES ($1, $2)
             ON CONFLICT (username) DO NOTHING",
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

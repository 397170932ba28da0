// ============================================================================
// Vision Infrastructure - PostgreSQL Company Repository
// File: crates/vision-infrastructure/src/database/postgres/company_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::error;
use uuid::Uuid;
use vision_shared::types::AuditFields;

use vision_core::domain::Company;
use vision_core::error::DomainError;
use vision_core::repositories::CompanyRepository;

use super::map_sqlx_error;

pub struct PgCompanyRepository {
    pool: PgPool,
}

impl PgCompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct CompanyRow {
    pub id: Uuid,
    pub client_id: Uuid,
    pub root_key: String,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
    pub removed_at: Option<DateTime<Utc>>,
    pub removed_by: Option<Uuid>,
}

impl From<CompanyRow> for Company {
    fn from(row: CompanyRow) -> Self {
        Company {
            id: row.id,
            client_id: row.client_id,
            root_key: row.root_key,
            name: row.name,
            is_active: row.is_active,
            audit: AuditFields {
                created_at: row.created_at,
                created_by: row.created_by,
                modified_at: row.modified_at,
                modified_by: row.modified_by,
                removed_at: row.removed_at,
                removed_by: row.removed_by,
            },
        }
    }
}

#[async_trait]
impl CompanyRepository for PgCompanyRepository {
    async fn list_active_by_client(&self, client_id: Uuid) -> Result<Vec<Company>, DomainError> {
        let rows: Vec<CompanyRow> = sqlx::query_as(
            r#"
            SELECT
                id, client_id, root_key, name, is_active,
                created_at, created_by, modified_at, modified_by,
                removed_at, removed_by
            FROM companies
            WHERE client_id = $1
              AND is_active = TRUE
              AND removed_at IS NULL
            ORDER BY name
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error listing companies: {}", e);
            map_sqlx_error("listing companies", e)
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

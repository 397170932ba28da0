// ============================================================================
// Vision Infrastructure - PostgreSQL Grant Repository
// File: crates/vision-infrastructure/src/database/postgres/grant_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::error;
use uuid::Uuid;
use vision_shared::types::AuditFields;

use vision_core::domain::AccessGrant;
use vision_core::error::DomainError;
use vision_core::repositories::GrantRepository;

use super::map_sqlx_error;

pub struct PgGrantRepository {
    pool: PgPool,
}

impl PgGrantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct AccessGrantRow {
    pub id: Uuid,
    pub operator_id: Uuid,
    pub client_id: Uuid,
    pub company_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
    pub removed_at: Option<DateTime<Utc>>,
    pub removed_by: Option<Uuid>,
}

impl From<AccessGrantRow> for AccessGrant {
    fn from(row: AccessGrantRow) -> Self {
        AccessGrant {
            id: row.id,
            operator_id: row.operator_id,
            client_id: row.client_id,
            company_id: row.company_id,
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
impl GrantRepository for PgGrantRepository {
    async fn list_active_for_operator(
        &self,
        operator_id: Uuid,
        client_id: Uuid,
    ) -> Result<Vec<AccessGrant>, DomainError> {
        let rows: Vec<AccessGrantRow> = sqlx::query_as(
            r#"
            SELECT
                id, operator_id, client_id, company_id, is_active,
                created_at, created_by, modified_at, modified_by,
                removed_at, removed_by
            FROM access_grants
            WHERE operator_id = $1
              AND client_id = $2
              AND is_active = TRUE
              AND removed_at IS NULL
            "#,
        )
        .bind(operator_id)
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error listing grants: {}", e);
            map_sqlx_error("listing grants", e)
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

// ============================================================================
// Vision Infrastructure - PostgreSQL Vision Repository
// File: crates/vision-infrastructure/src/database/postgres/vision_repo_impl.rs
// ============================================================================
//! Vision persistence. Header, materialized membership rows, and group rows
//! are written and removed inside one transaction; the partial unique
//! indexes of the schema are the authority for the sibling-collision rules.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::{error, info};
use uuid::Uuid;
use vision_shared::types::AuditFields;

use vision_core::domain::{StoredVision, Vision, VisionScope, VisionType};
use vision_core::error::DomainError;
use vision_core::repositories::VisionRepository;

use super::map_sqlx_error;

pub struct PgVisionRepository {
    pool: PgPool,
}

impl PgVisionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_children(
        &self,
        vision_ids: &[Uuid],
    ) -> Result<(HashMap<Uuid, BTreeSet<String>>, HashMap<Uuid, BTreeSet<Uuid>>), DomainError>
    {
        let root_rows: Vec<GroupRootRow> = sqlx::query_as(
            r#"
            SELECT vision_id, root_key
            FROM vision_group_roots
            WHERE vision_id = ANY($1)
            "#,
        )
        .bind(vision_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("loading group roots", e))?;

        let membership_rows: Vec<MembershipRow> = sqlx::query_as(
            r#"
            SELECT vision_id, company_id
            FROM vision_companies
            WHERE vision_id = ANY($1)
            "#,
        )
        .bind(vision_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("loading membership", e))?;

        let mut roots: HashMap<Uuid, BTreeSet<String>> = HashMap::new();
        for row in root_rows {
            roots.entry(row.vision_id).or_default().insert(row.root_key);
        }
        let mut membership: HashMap<Uuid, BTreeSet<Uuid>> = HashMap::new();
        for row in membership_rows {
            membership.entry(row.vision_id).or_default().insert(row.company_id);
        }
        Ok((roots, membership))
    }

    async fn load_many(&self, rows: Vec<VisionRow>) -> Result<Vec<StoredVision>, DomainError> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let (mut roots, mut membership) = self.load_children(&ids).await?;
        rows.into_iter()
            .map(|row| {
                let vision_roots = roots.remove(&row.id).unwrap_or_default();
                let vision_membership = membership.remove(&row.id).unwrap_or_default();
                assemble(row, vision_roots, vision_membership)
            })
            .collect()
    }
}

// Internal row types for SQLx mapping
#[derive(Debug, FromRow)]
struct VisionRow {
    pub id: Uuid,
    pub client_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub vision_type: String,
    pub root_key: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
    pub removed_at: Option<DateTime<Utc>>,
    pub removed_by: Option<Uuid>,
}

#[derive(Debug, FromRow)]
struct GroupRootRow {
    pub vision_id: Uuid,
    pub root_key: String,
}

#[derive(Debug, FromRow)]
struct MembershipRow {
    pub vision_id: Uuid,
    pub company_id: Uuid,
}

const VISION_COLUMNS: &str = r#"
    id, client_id, name, description, vision_type, root_key, is_active,
    created_at, created_by, modified_at, modified_by, removed_at, removed_by
"#;

fn assemble(
    row: VisionRow,
    roots: BTreeSet<String>,
    membership: BTreeSet<Uuid>,
) -> Result<StoredVision, DomainError> {
    let vision_type = VisionType::from_str(&row.vision_type).ok_or_else(|| {
        DomainError::DatabaseError(format!("unknown vision type: {}", row.vision_type))
    })?;
    let scope = match vision_type {
        VisionType::ClientWide => VisionScope::ClientWide,
        VisionType::RootScoped => VisionScope::RootScoped { root: row.root_key.clone() },
        VisionType::GroupScoped => VisionScope::GroupScoped { roots },
        // A custom vision's parameters are its membership rows.
        VisionType::Custom => VisionScope::Custom { companies: membership.clone() },
    };
    Ok(StoredVision {
        vision: Vision {
            id: row.id,
            client_id: row.client_id,
            name: row.name,
            description: row.description,
            is_active: row.is_active,
            scope,
            audit: AuditFields {
                created_at: row.created_at,
                created_by: row.created_by,
                modified_at: row.modified_at,
                modified_by: row.modified_by,
                removed_at: row.removed_at,
                removed_by: row.removed_by,
            },
        },
        membership,
    })
}

fn root_column(scope: &VisionScope) -> Option<&str> {
    match scope {
        VisionScope::RootScoped { root } => root.as_deref(),
        _ => None,
    }
}

fn group_roots(scope: &VisionScope) -> Vec<&str> {
    match scope {
        VisionScope::GroupScoped { roots } => roots.iter().map(|r| r.as_str()).collect(),
        _ => Vec::new(),
    }
}

async fn write_children(
    tx: &mut Transaction<'_, Postgres>,
    vision: &Vision,
    membership: &BTreeSet<Uuid>,
) -> Result<(), sqlx::Error> {
    for root_key in group_roots(&vision.scope) {
        sqlx::query(
            r#"
            INSERT INTO vision_group_roots (vision_id, client_id, root_key, is_active)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(vision.id)
        .bind(vision.client_id)
        .bind(root_key)
        .bind(vision.is_active)
        .execute(&mut **tx)
        .await?;
    }
    for company_id in membership {
        sqlx::query(
            r#"
            INSERT INTO vision_companies (vision_id, company_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(vision.id)
        .bind(company_id)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

async fn delete_children(
    tx: &mut Transaction<'_, Postgres>,
    vision_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM vision_group_roots WHERE vision_id = $1")
        .bind(vision_id)
        .execute(&mut **tx)
        .await?;
    sqlx::query("DELETE FROM vision_companies WHERE vision_id = $1")
        .bind(vision_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

#[async_trait]
impl VisionRepository for PgVisionRepository {
    async fn find_by_id(&self, vision_id: Uuid) -> Result<Option<StoredVision>, DomainError> {
        let row: Option<VisionRow> = sqlx::query_as(&format!(
            "SELECT {VISION_COLUMNS} FROM visions WHERE id = $1 AND removed_at IS NULL"
        ))
        .bind(vision_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error finding vision by id: {}", e);
            map_sqlx_error("finding vision", e)
        })?;

        match row {
            None => Ok(None),
            Some(row) => {
                let (mut roots, mut membership) = self.load_children(&[row.id]).await?;
                let vision_roots = roots.remove(&row.id).unwrap_or_default();
                let vision_membership = membership.remove(&row.id).unwrap_or_default();
                Ok(Some(assemble(row, vision_roots, vision_membership)?))
            }
        }
    }

    async fn list_by_client(&self, client_id: Uuid) -> Result<Vec<StoredVision>, DomainError> {
        let rows: Vec<VisionRow> = sqlx::query_as(&format!(
            r#"
            SELECT {VISION_COLUMNS}
            FROM visions
            WHERE client_id = $1 AND removed_at IS NULL
            ORDER BY name
            "#
        ))
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error listing visions: {}", e);
            map_sqlx_error("listing visions", e)
        })?;

        self.load_many(rows).await
    }

    async fn list_active_by_type(
        &self,
        client_id: Uuid,
        vision_type: VisionType,
    ) -> Result<Vec<StoredVision>, DomainError> {
        let rows: Vec<VisionRow> = sqlx::query_as(&format!(
            r#"
            SELECT {VISION_COLUMNS}
            FROM visions
            WHERE client_id = $1
              AND vision_type = $2
              AND is_active = TRUE
              AND removed_at IS NULL
            "#
        ))
        .bind(client_id)
        .bind(vision_type.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error listing sibling visions: {}", e);
            map_sqlx_error("listing sibling visions", e)
        })?;

        self.load_many(rows).await
    }

    async fn create(
        &self,
        vision: &Vision,
        membership: &BTreeSet<Uuid>,
    ) -> Result<Uuid, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("starting transaction", e))?;

        let result: Result<(), sqlx::Error> = async {
            sqlx::query(
                r#"
                INSERT INTO visions (
                    id, client_id, name, description, vision_type, root_key,
                    is_active, created_at, created_by, modified_at, modified_by,
                    removed_at, removed_by
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                "#,
            )
            .bind(vision.id)
            .bind(vision.client_id)
            .bind(&vision.name)
            .bind(&vision.description)
            .bind(vision.vision_type().as_str())
            .bind(root_column(&vision.scope))
            .bind(vision.is_active)
            .bind(vision.audit.created_at)
            .bind(vision.audit.created_by)
            .bind(vision.audit.modified_at)
            .bind(vision.audit.modified_by)
            .bind(vision.audit.removed_at)
            .bind(vision.audit.removed_by)
            .execute(&mut *tx)
            .await?;

            write_children(&mut tx, vision, membership).await
        }
        .await;

        if let Err(e) = result {
            error!("Database error creating vision: {}", e);
            return Err(map_sqlx_error("creating vision", e));
        }

        tx.commit().await.map_err(|e| map_sqlx_error("committing create", e))?;
        info!("Created vision {} ({} membership rows)", vision.id, membership.len());
        Ok(vision.id)
    }

    async fn update(
        &self,
        vision: &Vision,
        membership: &BTreeSet<Uuid>,
    ) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("starting transaction", e))?;

        let updated = sqlx::query(
            r#"
            UPDATE visions
            SET name = $2, description = $3, vision_type = $4, root_key = $5,
                is_active = $6, modified_at = $7, modified_by = $8
            WHERE id = $1 AND removed_at IS NULL
            "#,
        )
        .bind(vision.id)
        .bind(&vision.name)
        .bind(&vision.description)
        .bind(vision.vision_type().as_str())
        .bind(root_column(&vision.scope))
        .bind(vision.is_active)
        .bind(vision.audit.modified_at)
        .bind(vision.audit.modified_by)
        .execute(&mut *tx)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error updating vision: {}", e);
            map_sqlx_error("updating vision", e)
        })?;

        if updated.rows_affected() == 0 {
            return Err(DomainError::VisionNotFound);
        }

        let result: Result<(), sqlx::Error> = async {
            // Membership and group rows are rewritten wholesale, never patched.
            delete_children(&mut tx, vision.id).await?;
            write_children(&mut tx, vision, membership).await
        }
        .await;

        if let Err(e) = result {
            error!("Database error rewriting vision children: {}", e);
            return Err(map_sqlx_error("rewriting vision children", e));
        }

        tx.commit().await.map_err(|e| map_sqlx_error("committing update", e))?;
        info!("Updated vision {} ({} membership rows)", vision.id, membership.len());
        Ok(())
    }

    async fn delete(&self, vision_id: Uuid) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("starting transaction", e))?;

        if let Err(e) = delete_children(&mut tx, vision_id).await {
            error!("Database error deleting vision children: {}", e);
            return Err(map_sqlx_error("deleting vision children", e));
        }

        let deleted = sqlx::query("DELETE FROM visions WHERE id = $1")
            .bind(vision_id)
            .execute(&mut *tx)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error deleting vision: {}", e);
                map_sqlx_error("deleting vision", e)
            })?;

        if deleted.rows_affected() == 0 {
            return Err(DomainError::VisionNotFound);
        }

        tx.commit().await.map_err(|e| map_sqlx_error("committing delete", e))?;
        info!("Deleted vision {}", vision_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(vision_type: &str, root_key: Option<&str>) -> VisionRow {
        VisionRow {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            name: "V".to_string(),
            description: None,
            vision_type: vision_type.to_string(),
            root_key: root_key.map(|r| r.to_string()),
            is_active: true,
            created_at: Utc::now(),
            created_by: None,
            modified_at: None,
            modified_by: None,
            removed_at: None,
            removed_by: None,
        }
    }

    #[test]
    fn test_assemble_root_scoped_takes_root_column() {
        let stored = assemble(row("root_scoped", Some("R1")), BTreeSet::new(), BTreeSet::new())
            .unwrap();
        assert_eq!(
            stored.vision.scope,
            VisionScope::RootScoped { root: Some("R1".to_string()) }
        );
    }

    #[test]
    fn test_assemble_group_scoped_takes_child_rows() {
        let roots: BTreeSet<String> = ["R1".to_string(), "R2".to_string()].into_iter().collect();
        let stored = assemble(row("group_scoped", None), roots.clone(), BTreeSet::new()).unwrap();
        assert_eq!(stored.vision.scope, VisionScope::GroupScoped { roots });
    }

    #[test]
    fn test_assemble_custom_params_are_the_membership() {
        let membership: BTreeSet<Uuid> = [Uuid::new_v4()].into_iter().collect();
        let stored = assemble(row("custom", None), BTreeSet::new(), membership.clone()).unwrap();
        assert_eq!(stored.vision.scope, VisionScope::Custom { companies: membership.clone() });
        assert_eq!(stored.membership, membership);
    }

    #[test]
    fn test_assemble_unknown_type_is_an_error() {
        let err = assemble(row("mystery", None), BTreeSet::new(), BTreeSet::new()).unwrap_err();
        assert!(matches!(err, DomainError::DatabaseError(_)));
    }

    #[test]
    fn test_root_column_only_set_for_root_scoped() {
        assert_eq!(root_column(&VisionScope::RootScoped { root: Some("R1".to_string()) }), Some("R1"));
        assert_eq!(root_column(&VisionScope::ClientWide), None);
        let roots: BTreeSet<String> = ["R1".to_string()].into_iter().collect();
        assert_eq!(root_column(&VisionScope::GroupScoped { roots: roots.clone() }), None);
        assert_eq!(group_roots(&VisionScope::GroupScoped { roots }), vec!["R1"]);
    }
}

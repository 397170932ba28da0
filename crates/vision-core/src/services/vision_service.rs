// ============================================================================
// Vision Core - Vision Service
// File: crates/vision-core/src/services/vision_service.rs
// ============================================================================
//! Vision scoping service: access resolution, membership derivation,
//! uniqueness pre-flight, and visibility-checked CRUD over visions.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;
use vision_shared::constants::MAX_ROOT_KEY_LENGTH;
use vision_shared::types::{new_id, AuditFields};

use crate::domain::{Company, Vision, VisionDraft, VisionScope, VisionSummary, VisionType};
use crate::error::DomainError;
use crate::repositories::{CompanyRepository, GrantRepository, VisionRepository};
use crate::scoping;
use crate::scoping::{AccessDecision, UniquenessOutcome};

/// Orchestrates the pure scoping components over the repository ports.
/// Fetching rows is the only suspension point; every decision is made by the
/// deterministic functions in [`crate::scoping`].
pub struct VisionService<G: GrantRepository, C: CompanyRepository, V: VisionRepository> {
    grant_repo: Arc<G>,
    company_repo: Arc<C>,
    vision_repo: Arc<V>,
}

impl<G: GrantRepository, C: CompanyRepository, V: VisionRepository> VisionService<G, C, V> {
    pub fn new(grant_repo: Arc<G>, company_repo: Arc<C>, vision_repo: Arc<V>) -> Self {
        Self { grant_repo, company_repo, vision_repo }
    }

    /// Resolve what the operator may access within the client.
    ///
    /// Zero usable grants resolve to an empty scoped decision, which the
    /// mutating operations below translate into `PermissionDenied`.
    pub async fn resolve_access(
        &self,
        operator_id: Uuid,
        client_id: Uuid,
    ) -> Result<AccessDecision, DomainError> {
        let grants =
            self.grant_repo.list_active_for_operator(operator_id, client_id).await?;
        Ok(scoping::resolve_access(&grants))
    }

    /// The client's active companies, narrowed to the given decision.
    pub async fn list_accessible_companies(
        &self,
        client_id: Uuid,
        access: &AccessDecision,
    ) -> Result<Vec<Company>, DomainError> {
        let companies = self.company_repo.list_active_by_client(client_id).await?;
        Ok(companies.into_iter().filter(|c| access.allows_company(c.id)).collect())
    }

    pub fn allowed_vision_types(&self, access: &AccessDecision) -> &'static [VisionType] {
        scoping::allowed_vision_types(access)
    }

    /// Pre-flight collision check against the active same-type siblings.
    /// Advisory only: the storage layer's unique indexes remain the
    /// authority under concurrent writers.
    pub async fn check_uniqueness(
        &self,
        client_id: Uuid,
        scope: &VisionScope,
        exclude: Option<Uuid>,
    ) -> Result<UniquenessOutcome, DomainError> {
        if scope.vision_type() == VisionType::Custom {
            return Ok(UniquenessOutcome::NoConflict);
        }
        let siblings =
            self.vision_repo.list_active_by_type(client_id, scope.vision_type()).await?;
        Ok(scoping::check_uniqueness(scope, exclude, &siblings))
    }

    /// Create or update a vision from an operator draft.
    ///
    /// Runs the full pipeline: draft validation, access resolution, type
    /// gate, roster narrowing, membership derivation, uniqueness pre-flight,
    /// then one transactional persist of header, membership rows, and group
    /// rows.
    pub async fn save_vision(
        &self,
        operator_id: Uuid,
        draft: VisionDraft,
    ) -> Result<Uuid, DomainError> {
        draft.validate().map_err(|e| DomainError::ValidationError(e.to_string()))?;
        validate_scope_for_save(&draft.scope)?;

        let access = self.resolve_access(operator_id, draft.client_id).await?;
        if !access.has_any_access() {
            warn!("Save rejected: operator {} has no access to client {}", operator_id, draft.client_id);
            return Err(DomainError::PermissionDenied(draft.client_id));
        }
        scoping::ensure_type_allowed(&access, draft.vision_type())?;

        let roster = self.list_accessible_companies(draft.client_id, &access).await?;
        let membership = scoping::resolve_membership(&draft.scope, &roster)?;

        let existing = match draft.id {
            Some(vision_id) => {
                let stored = self
                    .vision_repo
                    .find_by_id(vision_id)
                    .await?
                    .ok_or(DomainError::VisionNotFound)?;
                // Cross-tenant ids and visions outside the operator's scope
                // are indistinguishable from missing ones.
                if stored.vision.client_id != draft.client_id
                    || !scoping::is_visible(&access, &stored)
                {
                    return Err(DomainError::VisionNotFound);
                }
                Some(stored)
            }
            None => None,
        };

        if draft.is_active && draft.vision_type() != VisionType::Custom {
            let siblings = self
                .vision_repo
                .list_active_by_type(draft.client_id, draft.vision_type())
                .await?;
            let exclude = existing.as_ref().map(|s| s.vision.id);
            if let UniquenessOutcome::Conflict { vision_id, reason } =
                scoping::check_uniqueness(&draft.scope, exclude, &siblings)
            {
                warn!("Save rejected: draft collides with vision {}: {}", vision_id, reason);
                return Err(DomainError::VisionConflict {
                    conflicting: Some(vision_id),
                    reason: reason.to_string(),
                });
            }
        }

        match existing {
            None => {
                let vision = Vision {
                    id: new_id(),
                    client_id: draft.client_id,
                    name: draft.name.trim().to_string(),
                    description: draft.description.as_deref().map(|d| d.trim().to_string()),
                    is_active: draft.is_active,
                    scope: draft.scope,
                    audit: AuditFields::new(Some(operator_id)),
                };
                let vision_id = self.vision_repo.create(&vision, &membership).await?;
                info!(
                    "Created {} vision {} with {} companies",
                    vision.vision_type(),
                    vision_id,
                    membership.len()
                );
                Ok(vision_id)
            }
            Some(stored) => {
                let mut vision = stored.vision;
                vision.name = draft.name.trim().to_string();
                vision.description = draft.description.as_deref().map(|d| d.trim().to_string());
                vision.is_active = draft.is_active;
                vision.scope = draft.scope;
                vision.audit.touch(operator_id);
                self.vision_repo.update(&vision, &membership).await?;
                info!(
                    "Updated {} vision {} with {} companies",
                    vision.vision_type(),
                    vision.id,
                    membership.len()
                );
                Ok(vision.id)
            }
        }
    }

    /// The client's visions visible to the operator, as listing rows with
    /// their materialized company counts.
    pub async fn list_visible_visions(
        &self,
        operator_id: Uuid,
        client_id: Uuid,
    ) -> Result<Vec<VisionSummary>, DomainError> {
        let access = self.resolve_access(operator_id, client_id).await?;
        if !access.has_any_access() {
            return Err(DomainError::PermissionDenied(client_id));
        }
        let visions = self.vision_repo.list_by_client(client_id).await?;
        let visible = scoping::filter_visible(&access, visions);
        Ok(visible.iter().map(VisionSummary::from).collect())
    }

    /// Remove a vision with its membership and group rows as one unit.
    pub async fn delete_vision(
        &self,
        operator_id: Uuid,
        client_id: Uuid,
        vision_id: Uuid,
    ) -> Result<(), DomainError> {
        let access = self.resolve_access(operator_id, client_id).await?;
        if !access.has_any_access() {
            return Err(DomainError::PermissionDenied(client_id));
        }
        let stored = self
            .vision_repo
            .find_by_id(vision_id)
            .await?
            .ok_or(DomainError::VisionNotFound)?;
        if stored.vision.client_id != client_id || !scoping::is_visible(&access, &stored) {
            return Err(DomainError::VisionNotFound);
        }
        self.vision_repo.delete(vision_id).await?;
        info!("Deleted vision {} of client {}", vision_id, client_id);
        Ok(())
    }
}

fn validate_scope_for_save(scope: &VisionScope) -> Result<(), DomainError> {
    if !scope.is_complete() {
        return Err(DomainError::ValidationError(
            "vision scope configuration is incomplete".to_string(),
        ));
    }
    let keys: Vec<&String> = match scope {
        VisionScope::RootScoped { root: Some(root) } => vec![root],
        VisionScope::GroupScoped { roots } => roots.iter().collect(),
        _ => Vec::new(),
    };
    for key in keys {
        if key.trim().is_empty() || key.len() > MAX_ROOT_KEY_LENGTH {
            return Err(DomainError::ValidationError(format!("invalid root key: {key:?}")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use crate::domain::{AccessGrant, StoredVision};
    use crate::repositories::{
        MockCompanyRepository, MockGrantRepository, MockVisionRepository,
    };

    fn company(client_id: Uuid, root_key: &str, name: &str) -> Company {
        Company::new(client_id, root_key.to_string(), name.to_string())
    }

    fn stored(
        client_id: Uuid,
        scope: VisionScope,
        membership: BTreeSet<Uuid>,
    ) -> StoredVision {
        StoredVision {
            vision: Vision {
                id: new_id(),
                client_id,
                name: "Existing".to_string(),
                description: None,
                is_active: true,
                scope,
                audit: AuditFields::default(),
            },
            membership,
        }
    }

    fn draft(client_id: Uuid, scope: VisionScope) -> VisionDraft {
        VisionDraft {
            id: None,
            client_id,
            name: "Consolidated".to_string(),
            description: None,
            is_active: true,
            scope,
        }
    }

    struct Fixture {
        grant_repo: MockGrantRepository,
        company_repo: MockCompanyRepository,
        vision_repo: MockVisionRepository,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                grant_repo: MockGrantRepository::new(),
                company_repo: MockCompanyRepository::new(),
                vision_repo: MockVisionRepository::new(),
            }
        }

        fn grants(&mut self, grants: Vec<AccessGrant>) {
            self.grant_repo
                .expect_list_active_for_operator()
                .returning(move |_, _| Ok(grants.clone()));
        }

        fn roster(&mut self, companies: Vec<Company>) {
            self.company_repo
                .expect_list_active_by_client()
                .returning(move |_| Ok(companies.clone()));
        }

        fn service(
            self,
        ) -> VisionService<MockGrantRepository, MockCompanyRepository, MockVisionRepository>
        {
            VisionService::new(
                Arc::new(self.grant_repo),
                Arc::new(self.company_repo),
                Arc::new(self.vision_repo),
            )
        }
    }

    #[tokio::test]
    async fn test_scoped_operator_gets_only_custom_type() {
        let operator_id = new_id();
        let client_id = new_id();
        let a = new_id();

        let mut fx = Fixture::new();
        fx.grants(vec![AccessGrant::single_company(operator_id, client_id, a, None)]);
        let service = fx.service();

        let access = service.resolve_access(operator_id, client_id).await.unwrap();
        assert_eq!(access, AccessDecision::scoped([a]));
        assert_eq!(service.allowed_vision_types(&access), &[VisionType::Custom]);
    }

    #[tokio::test]
    async fn test_scoped_operator_cannot_save_client_wide() {
        let operator_id = new_id();
        let client_id = new_id();

        let mut fx = Fixture::new();
        fx.grants(vec![AccessGrant::single_company(operator_id, client_id, new_id(), None)]);
        let service = fx.service();

        let err = service
            .save_vision(operator_id, draft(client_id, VisionScope::ClientWide))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::VisionTypeNotAllowed(_)));
    }

    #[tokio::test]
    async fn test_operator_without_grants_is_denied() {
        let operator_id = new_id();
        let client_id = new_id();

        let mut fx = Fixture::new();
        fx.grants(vec![]);
        let service = fx.service();

        let err = service.list_visible_visions(operator_id, client_id).await.unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied(id) if id == client_id));
    }

    #[tokio::test]
    async fn test_root_scoped_save_materializes_membership() {
        let operator_id = new_id();
        let client_id = new_id();
        let roster = vec![
            company(client_id, "R1", "A"),
            company(client_id, "R1", "B"),
            company(client_id, "R2", "C"),
        ];
        let expected: BTreeSet<Uuid> =
            roster.iter().filter(|c| c.root_key == "R1").map(|c| c.id).collect();

        let mut fx = Fixture::new();
        fx.grants(vec![AccessGrant::full_client(operator_id, client_id, None)]);
        fx.roster(roster);
        fx.vision_repo.expect_list_active_by_type().returning(|_, _| Ok(vec![]));
        let check = expected.clone();
        fx.vision_repo
            .expect_create()
            .withf(move |vision, membership| {
                vision.vision_type() == VisionType::RootScoped && *membership == check
            })
            .returning(|vision, _| Ok(vision.id));
        let service = fx.service();

        let scope = VisionScope::RootScoped { root: Some("R1".to_string()) };
        let result = service.save_vision(operator_id, draft(client_id, scope)).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_second_client_wide_save_conflicts() {
        let operator_id = new_id();
        let client_id = new_id();
        let existing = stored(client_id, VisionScope::ClientWide, BTreeSet::new());
        let existing_id = existing.vision.id;

        let mut fx = Fixture::new();
        fx.grants(vec![AccessGrant::full_client(operator_id, client_id, None)]);
        fx.roster(vec![company(client_id, "R1", "A")]);
        fx.vision_repo
            .expect_list_active_by_type()
            .returning(move |_, _| Ok(vec![existing.clone()]));
        let service = fx.service();

        let err = service
            .save_vision(operator_id, draft(client_id, VisionScope::ClientWide))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::VisionConflict { conflicting: Some(id), .. } if id == existing_id
        ));
    }

    #[tokio::test]
    async fn test_root_scoped_other_root_passes_uniqueness() {
        let client_id = new_id();
        let existing = stored(
            client_id,
            VisionScope::RootScoped { root: Some("R1".to_string()) },
            BTreeSet::new(),
        );

        let mut fx = Fixture::new();
        fx.vision_repo
            .expect_list_active_by_type()
            .returning(move |_, _| Ok(vec![existing.clone()]));
        let service = fx.service();

        let same = VisionScope::RootScoped { root: Some("R1".to_string()) };
        let outcome = service.check_uniqueness(client_id, &same, None).await.unwrap();
        assert!(outcome.is_conflict());

        let other = VisionScope::RootScoped { root: Some("R2".to_string()) };
        let outcome = service.check_uniqueness(client_id, &other, None).await.unwrap();
        assert_eq!(outcome, UniquenessOutcome::NoConflict);
    }

    #[tokio::test]
    async fn test_custom_draft_outside_roster_is_rejected() {
        let operator_id = new_id();
        let client_id = new_id();
        let mine = company(client_id, "R1", "A");
        let other = company(client_id, "R2", "B");
        let mine_id = mine.id;
        let other_id = other.id;

        let mut fx = Fixture::new();
        fx.grants(vec![AccessGrant::single_company(operator_id, client_id, mine_id, None)]);
        fx.roster(vec![mine, other]);
        let service = fx.service();

        let scope =
            VisionScope::Custom { companies: [mine_id, other_id].into_iter().collect() };
        let err = service.save_vision(operator_id, draft(client_id, scope)).await.unwrap_err();
        assert!(matches!(err, DomainError::CompanyOutsideScope(id) if id == other_id));
    }

    #[tokio::test]
    async fn test_listing_hides_visions_outside_scope() {
        let operator_id = new_id();
        let client_id = new_id();
        let a = new_id();
        let b = new_id();
        let c = new_id();

        let wide = stored(
            client_id,
            VisionScope::ClientWide,
            [a, b, c].into_iter().collect(),
        );
        let custom = stored(
            client_id,
            VisionScope::Custom { companies: [a].into_iter().collect() },
            [a].into_iter().collect(),
        );
        let custom_id = custom.vision.id;

        let mut fx = Fixture::new();
        fx.grants(vec![AccessGrant::single_company(operator_id, client_id, a, None)]);
        fx.vision_repo
            .expect_list_by_client()
            .returning(move |_| Ok(vec![wide.clone(), custom.clone()]));
        let service = fx.service();

        let summaries = service.list_visible_visions(operator_id, client_id).await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].id, custom_id);
        assert_eq!(summaries[0].company_count, 1);
    }

    #[tokio::test]
    async fn test_resave_unchanged_vision_passes_own_check() {
        let operator_id = new_id();
        let client_id = new_id();
        let roster = vec![company(client_id, "R1", "A"), company(client_id, "R2", "B")];
        let membership: BTreeSet<Uuid> =
            roster.iter().filter(|c| c.root_key == "R1").map(|c| c.id).collect();
        let existing = stored(
            client_id,
            VisionScope::RootScoped { root: Some("R1".to_string()) },
            membership,
        );
        let existing_id = existing.vision.id;

        let mut fx = Fixture::new();
        fx.grants(vec![AccessGrant::full_client(operator_id, client_id, None)]);
        fx.roster(roster);
        let found = existing.clone();
        fx.vision_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        fx.vision_repo
            .expect_list_active_by_type()
            .returning(move |_, _| Ok(vec![existing.clone()]));
        fx.vision_repo.expect_update().returning(|_, _| Ok(()));
        let service = fx.service();

        let mut d = draft(client_id, VisionScope::RootScoped { root: Some("R1".to_string()) });
        d.id = Some(existing_id);
        d.name = "Existing".to_string();
        let result = service.save_vision(operator_id, d).await;
        assert_eq!(result.unwrap(), existing_id);
    }

    #[tokio::test]
    async fn test_delete_cross_tenant_vision_is_not_found() {
        let operator_id = new_id();
        let client_id = new_id();
        let other_client_id = new_id();
        let foreign = stored(other_client_id, VisionScope::ClientWide, BTreeSet::new());
        let foreign_id = foreign.vision.id;

        let mut fx = Fixture::new();
        fx.grants(vec![AccessGrant::full_client(operator_id, client_id, None)]);
        fx.vision_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(foreign.clone())));
        let service = fx.service();

        let err = service
            .delete_vision(operator_id, client_id, foreign_id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::VisionNotFound));
    }

    #[tokio::test]
    async fn test_incomplete_root_scope_cannot_be_saved() {
        let operator_id = new_id();
        let client_id = new_id();

        let fx = Fixture::new();
        let service = fx.service();

        let err = service
            .save_vision(operator_id, draft(client_id, VisionScope::RootScoped { root: None }))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));
    }
}

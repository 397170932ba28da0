//! Vision repository trait (port)
//!
//! `create`, `update` and `delete` cover the vision header, its materialized
//! membership rows, and its group rows as one transactional unit: either all
//! writes land or none are visible to subsequent reads.

use std::collections::BTreeSet;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use uuid::Uuid;

use crate::domain::{StoredVision, Vision, VisionType};
use crate::error::DomainError;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait VisionRepository: Send + Sync {
    async fn find_by_id(&self, vision_id: Uuid) -> Result<Option<StoredVision>, DomainError>;

    /// All visions of a client with their materialized membership.
    async fn list_by_client(&self, client_id: Uuid) -> Result<Vec<StoredVision>, DomainError>;

    /// Active visions of one client and one type, for sibling collision
    /// checks.
    async fn list_active_by_type(
        &self,
        client_id: Uuid,
        vision_type: VisionType,
    ) -> Result<Vec<StoredVision>, DomainError>;

    async fn create(
        &self,
        vision: &Vision,
        membership: &BTreeSet<Uuid>,
    ) -> Result<Uuid, DomainError>;

    /// Rewrites the header and fully replaces membership and group rows.
    async fn update(&self, vision: &Vision, membership: &BTreeSet<Uuid>)
        -> Result<(), DomainError>;

    async fn delete(&self, vision_id: Uuid) -> Result<(), DomainError>;
}

//! Access grant domain entity
//!
//! A grant gives an operator access to a whole client (`company_id == None`)
//! or to exactly one of its companies. An operator may hold any number of
//! grants per client; only active, non-removed grants participate in access
//! resolution.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vision_shared::types::AuditFields;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessGrant {
    pub id: Uuid,
    pub operator_id: Uuid,
    pub client_id: Uuid,
    /// `None` grants the entire client.
    pub company_id: Option<Uuid>,
    pub is_active: bool,

    #[serde(flatten)]
    pub audit: AuditFields,
}

impl AccessGrant {
    pub fn full_client(operator_id: Uuid, client_id: Uuid, created_by: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            operator_id,
            client_id,
            company_id: None,
            is_active: true,
            audit: AuditFields::new(created_by),
        }
    }

    pub fn single_company(
        operator_id: Uuid,
        client_id: Uuid,
        company_id: Uuid,
        created_by: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            operator_id,
            client_id,
            company_id: Some(company_id),
            is_active: true,
            audit: AuditFields::new(created_by),
        }
    }

    pub fn is_usable(&self) -> bool {
        self.is_active && !self.audit.is_deleted()
    }

    pub fn revoke(&mut self, revoked_by: Uuid) {
        self.is_active = false;
        self.audit.touch(revoked_by);
    }
}

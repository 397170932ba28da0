//! Company domain entity
//!
//! A company belongs to exactly one client and carries a grouping key
//! (`root_key`) shared by companies under the same legal umbrella. The key is
//! immutable for the lifetime of the record; company CRUD is owned by the
//! company-management system, this engine only reads the roster.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vision_shared::types::AuditFields;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: Uuid,
    pub client_id: Uuid,
    pub root_key: String,
    pub name: String,
    pub is_active: bool,

    #[serde(flatten)]
    pub audit: AuditFields,
}

impl Company {
    pub fn new(client_id: Uuid, root_key: String, name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            client_id,
            root_key: root_key.trim().to_string(),
            name: name.trim().to_string(),
            is_active: true,
            audit: AuditFields::default(),
        }
    }
}

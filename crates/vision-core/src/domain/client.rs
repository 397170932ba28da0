//! Client (tenant) domain entity

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vision_shared::types::AuditFields;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,

    #[serde(flatten)]
    pub audit: AuditFields,
}

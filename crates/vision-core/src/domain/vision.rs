//! Vision domain entity
//!
//! A vision is a named, saved scope selecting which companies of a client
//! feed a consolidated report. Its company set ("membership") is derived
//! from the scope configuration and materialized on every save so that
//! downstream consumers never re-derive it.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use vision_shared::types::AuditFields;

/// The four supported vision types, with fixed semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisionType {
    ClientWide,
    RootScoped,
    GroupScoped,
    Custom,
}

impl VisionType {
    pub const ALL: [VisionType; 4] = [
        VisionType::ClientWide,
        VisionType::RootScoped,
        VisionType::GroupScoped,
        VisionType::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VisionType::ClientWide => "client_wide",
            VisionType::RootScoped => "root_scoped",
            VisionType::GroupScoped => "group_scoped",
            VisionType::Custom => "custom",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "client_wide" => Some(VisionType::ClientWide),
            "root_scoped" => Some(VisionType::RootScoped),
            "group_scoped" => Some(VisionType::GroupScoped),
            "custom" => Some(VisionType::Custom),
            _ => None,
        }
    }
}

impl fmt::Display for VisionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scope configuration of a vision: the type together with its type-specific
/// parameters, as one tagged union instead of nullable columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VisionScope {
    /// Every company of the client.
    ClientWide,
    /// Companies sharing one grouping key. The root is `None` only while an
    /// operator is still editing a draft; saved visions always carry one.
    RootScoped { root: Option<String> },
    /// Union over a set of grouping keys.
    GroupScoped { roots: BTreeSet<String> },
    /// An explicit, operator-chosen company set. The set is the membership;
    /// there is no derivation parameter.
    Custom { companies: BTreeSet<Uuid> },
}

impl VisionScope {
    pub fn vision_type(&self) -> VisionType {
        match self {
            VisionScope::ClientWide => VisionType::ClientWide,
            VisionScope::RootScoped { .. } => VisionType::RootScoped,
            VisionScope::GroupScoped { .. } => VisionType::GroupScoped,
            VisionScope::Custom { .. } => VisionType::Custom,
        }
    }

    /// Blank configuration for a type. Used when the operator switches the
    /// type of a draft: parameters of the previous type are discarded.
    pub fn blank(vision_type: VisionType) -> Self {
        match vision_type {
            VisionType::ClientWide => VisionScope::ClientWide,
            VisionType::RootScoped => VisionScope::RootScoped { root: None },
            VisionType::GroupScoped => VisionScope::GroupScoped { roots: BTreeSet::new() },
            VisionType::Custom => VisionScope::Custom { companies: BTreeSet::new() },
        }
    }

    /// Whether the configuration is complete enough to be saved. Incomplete
    /// scopes still resolve (to the empty set) for interactive preview.
    pub fn is_complete(&self) -> bool {
        match self {
            VisionScope::ClientWide | VisionScope::Custom { .. } => true,
            VisionScope::RootScoped { root } => root.is_some(),
            VisionScope::GroupScoped { roots } => !roots.is_empty(),
        }
    }
}

/// Persisted vision entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vision {
    pub id: Uuid,
    pub client_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub scope: VisionScope,

    #[serde(flatten)]
    pub audit: AuditFields,
}

impl Vision {
    pub fn vision_type(&self) -> VisionType {
        self.scope.vision_type()
    }

    pub fn soft_delete(&mut self, deleted_by: Uuid) {
        self.audit.soft_delete(deleted_by);
        self.is_active = false;
    }

    pub fn is_deleted(&self) -> bool {
        self.audit.is_deleted()
    }
}

/// Unsaved vision configuration as submitted by an operator.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VisionDraft {
    /// `Some` when editing an existing vision, `None` when creating.
    pub id: Option<Uuid>,
    pub client_id: Uuid,

    #[validate(length(min = 2, max = 100, message = "Vision name must be between 2 and 100 characters"))]
    pub name: String,

    #[validate(length(max = 1000, message = "Description too long"))]
    pub description: Option<String>,

    pub is_active: bool,
    pub scope: VisionScope,
}

impl VisionDraft {
    pub fn vision_type(&self) -> VisionType {
        self.scope.vision_type()
    }
}

/// A persisted vision together with its materialized membership rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredVision {
    pub vision: Vision,
    pub membership: BTreeSet<Uuid>,
}

impl StoredVision {
    pub fn company_count(&self) -> usize {
        self.membership.len()
    }
}

/// Listing row returned to the console.
#[derive(Debug, Clone, Serialize)]
pub struct VisionSummary {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub vision_type: VisionType,
    pub is_active: bool,
    pub company_count: usize,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl From<&StoredVision> for VisionSummary {
    fn from(stored: &StoredVision) -> Self {
        Self {
            id: stored.vision.id,
            name: stored.vision.name.clone(),
            description: stored.vision.description.clone(),
            vision_type: stored.vision.vision_type(),
            is_active: stored.vision.is_active,
            company_count: stored.company_count(),
            created_at: stored.vision.audit.created_at,
            modified_at: stored.vision.audit.modified_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(scope: VisionScope) -> VisionDraft {
        VisionDraft {
            id: None,
            client_id: Uuid::new_v4(),
            name: "Quarterly".to_string(),
            description: None,
            is_active: true,
            scope,
        }
    }

    #[test]
    fn test_vision_type_round_trip() {
        for vision_type in VisionType::ALL {
            assert_eq!(VisionType::from_str(vision_type.as_str()), Some(vision_type));
        }
        assert_eq!(VisionType::from_str("unknown"), None);
    }

    #[test]
    fn test_blank_scope_matches_type() {
        for vision_type in VisionType::ALL {
            assert_eq!(VisionScope::blank(vision_type).vision_type(), vision_type);
        }
    }

    #[test]
    fn test_completeness() {
        assert!(VisionScope::ClientWide.is_complete());
        assert!(!VisionScope::RootScoped { root: None }.is_complete());
        assert!(VisionScope::RootScoped { root: Some("R1".into()) }.is_complete());
        assert!(!VisionScope::GroupScoped { roots: BTreeSet::new() }.is_complete());
        assert!(VisionScope::Custom { companies: BTreeSet::new() }.is_complete());
    }

    #[test]
    fn test_draft_name_validation() {
        let mut d = draft(VisionScope::ClientWide);
        assert!(d.validate().is_ok());
        d.name = "x".to_string();
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_scope_serializes_with_type_tag() {
        let scope = VisionScope::RootScoped { root: Some("R1".to_string()) };
        let json = serde_json::to_value(&scope).unwrap();
        assert_eq!(json["type"], "root_scoped");
        assert_eq!(json["root"], "R1");
    }
}

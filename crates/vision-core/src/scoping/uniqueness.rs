//! Uniqueness validation
//!
//! Pre-flight collision check between a candidate scope and the active
//! sibling visions of the same client. This is the early, user-facing
//! rejection; the authoritative constraint lives in the storage layer's
//! unique indexes, since a second operator can write between this check and
//! the save.

use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::{StoredVision, VisionScope, VisionType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ConflictReason {
    /// Another active client-wide vision already exists for the client.
    DuplicateClientWide,
    /// Another active root-scoped vision claims the same root.
    DuplicateRoot(String),
    /// Another active group-scoped vision claims at least one shared root.
    OverlappingRoots(Vec<String>),
}

impl fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictReason::DuplicateClientWide => {
                write!(f, "an active client-wide vision already exists for this client")
            }
            ConflictReason::DuplicateRoot(root) => {
                write!(f, "an active vision already covers root {root}")
            }
            ConflictReason::OverlappingRoots(roots) => {
                write!(f, "an active vision already covers roots {}", roots.join(", "))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum UniquenessOutcome {
    NoConflict,
    Conflict { vision_id: Uuid, reason: ConflictReason },
}

impl UniquenessOutcome {
    pub fn is_conflict(&self) -> bool {
        matches!(self, UniquenessOutcome::Conflict { .. })
    }
}

/// Check a candidate scope against sibling visions of its client.
///
/// Only active, non-removed siblings of the candidate's own type
/// participate; the vision being edited is excluded via `exclude` so an
/// unchanged re-save passes its own check. CUSTOM candidates never conflict.
pub fn check_uniqueness(
    candidate: &VisionScope,
    exclude: Option<Uuid>,
    siblings: &[StoredVision],
) -> UniquenessOutcome {
    let candidate_type = candidate.vision_type();
    if candidate_type == VisionType::Custom {
        return UniquenessOutcome::NoConflict;
    }

    for sibling in siblings {
        if Some(sibling.vision.id) == exclude
            || !sibling.vision.is_active
            || sibling.vision.is_deleted()
            || sibling.vision.vision_type() != candidate_type
        {
            continue;
        }
        match (candidate, &sibling.vision.scope) {
            (VisionScope::ClientWide, VisionScope::ClientWide) => {
                return UniquenessOutcome::Conflict {
                    vision_id: sibling.vision.id,
                    reason: ConflictReason::DuplicateClientWide,
                };
            }
            (
                VisionScope::RootScoped { root: Some(root) },
                VisionScope::RootScoped { root: Some(sibling_root) },
            ) if root == sibling_root => {
                return UniquenessOutcome::Conflict {
                    vision_id: sibling.vision.id,
                    reason: ConflictReason::DuplicateRoot(root.clone()),
                };
            }
            (
                VisionScope::GroupScoped { roots },
                VisionScope::GroupScoped { roots: sibling_roots },
            ) => {
                let shared: Vec<String> = roots.intersection(sibling_roots).cloned().collect();
                if !shared.is_empty() {
                    return UniquenessOutcome::Conflict {
                        vision_id: sibling.vision.id,
                        reason: ConflictReason::OverlappingRoots(shared),
                    };
                }
            }
            _ => {}
        }
    }
    UniquenessOutcome::NoConflict
}

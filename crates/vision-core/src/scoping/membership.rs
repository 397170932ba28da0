//! Membership resolution
//!
//! Pure derivation of a vision's company set from its scope configuration
//! and the roster the acting operator may see. The set is recomputed from
//! scratch on every call; callers re-invoke it after each parameter edit
//! instead of patching incrementally.

use std::collections::BTreeSet;

use uuid::Uuid;

use crate::domain::{Company, VisionScope};
use crate::error::DomainError;

/// Resolve the membership of a scope configuration against an accessible
/// roster.
///
/// The roster must already be filtered to the acting operator's decision:
/// every company of the client for full access, only the granted companies
/// otherwise. Incomplete configurations (unset root, empty root-set) resolve
/// to the empty set rather than failing, so interactive previews always get
/// a valid value. A CUSTOM scope referencing a company outside the roster is
/// rejected.
pub fn resolve_membership(
    scope: &VisionScope,
    roster: &[Company],
) -> Result<BTreeSet<Uuid>, DomainError> {
    match scope {
        VisionScope::ClientWide => Ok(roster.iter().map(|c| c.id).collect()),
        VisionScope::RootScoped { root: None } => Ok(BTreeSet::new()),
        VisionScope::RootScoped { root: Some(root) } => Ok(roster
            .iter()
            .filter(|c| c.root_key == *root)
            .map(|c| c.id)
            .collect()),
        VisionScope::GroupScoped { roots } => Ok(roster
            .iter()
            .filter(|c| roots.contains(&c.root_key))
            .map(|c| c.id)
            .collect()),
        VisionScope::Custom { companies } => {
            let roster_ids: BTreeSet<Uuid> = roster.iter().map(|c| c.id).collect();
            if let Some(outside) = companies.iter().find(|id| !roster_ids.contains(id)) {
                return Err(DomainError::CompanyOutsideScope(*outside));
            }
            Ok(companies.clone())
        }
    }
}

//! Access resolution
//!
//! Collapses an operator's grant rows for one client into a single decision:
//! full access, or a bounded set of allowed companies. The legacy encoding
//! (null company id on a grant row meaning "whole client") becomes an
//! explicit tagged union so call sites never null-check.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::AccessGrant;

/// What an operator may access within one client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "access", rename_all = "snake_case")]
pub enum AccessDecision {
    /// Every company of the client, present and future.
    Full,
    /// Exactly these companies. The empty set means "no access" and is a
    /// valid decision, not an error.
    Scoped { companies: BTreeSet<Uuid> },
}

impl AccessDecision {
    pub fn scoped<I: IntoIterator<Item = Uuid>>(companies: I) -> Self {
        AccessDecision::Scoped { companies: companies.into_iter().collect() }
    }

    pub fn is_full(&self) -> bool {
        matches!(self, AccessDecision::Full)
    }

    /// False only for `Scoped` with an empty company set.
    pub fn has_any_access(&self) -> bool {
        match self {
            AccessDecision::Full => true,
            AccessDecision::Scoped { companies } => !companies.is_empty(),
        }
    }

    pub fn allows_company(&self, company_id: Uuid) -> bool {
        match self {
            AccessDecision::Full => true,
            AccessDecision::Scoped { companies } => companies.contains(&company_id),
        }
    }
}

/// Resolve the decision from the operator's grant rows for the client.
/// Inactive and soft-removed grants are ignored; any usable grant without a
/// company reference wins as full access. Pure and deterministic.
pub fn resolve_access(grants: &[AccessGrant]) -> AccessDecision {
    let mut companies = BTreeSet::new();
    for grant in grants.iter().filter(|g| g.is_usable()) {
        match grant.company_id {
            None => return AccessDecision::Full,
            Some(company_id) => {
                companies.insert(company_id);
            }
        }
    }
    AccessDecision::Scoped { companies }
}

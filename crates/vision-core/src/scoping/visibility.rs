//! Visibility filtering
//!
//! Decides which persisted visions an operator may list or edit. A vision is
//! all-or-nothing: one company outside the operator's scope hides the whole
//! vision, there is no redacted partial view.

use crate::domain::StoredVision;
use crate::scoping::permission::AccessDecision;

/// Whether one vision is visible to the operator. Membership must be a
/// subset of the allowed set; the empty membership is a subset of anything,
/// so empty visions are visible to every operator with access to the client.
pub fn is_visible(access: &AccessDecision, stored: &StoredVision) -> bool {
    match access {
        AccessDecision::Full => true,
        AccessDecision::Scoped { companies } => stored.membership.is_subset(companies),
    }
}

/// Filter a client's visions down to those the operator may see.
pub fn filter_visible(access: &AccessDecision, visions: Vec<StoredVision>) -> Vec<StoredVision> {
    visions.into_iter().filter(|v| is_visible(access, v)).collect()
}

//! # Vision Core - Scoping Module
//!
//! The pure engine components: access resolution, type gating, membership
//! derivation, uniqueness validation, and visibility filtering. No I/O here;
//! callers fetch the rows and invoke these over data already in memory.

pub mod membership;
pub mod permission;
pub mod type_gate;
pub mod uniqueness;
pub mod visibility;

pub use membership::resolve_membership;
pub use permission::{resolve_access, AccessDecision};
pub use type_gate::{allowed_vision_types, ensure_type_allowed};
pub use uniqueness::{check_uniqueness, ConflictReason, UniquenessOutcome};
pub use visibility::{filter_visible, is_visible};

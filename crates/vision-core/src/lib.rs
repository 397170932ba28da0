//! # Vision Core
//!
//! Domain entities, the scoping engine, repository traits, and the vision
//! service for the multi-tenant reporting console.

pub mod domain;
pub mod error;
pub mod repositories;
pub mod scoping;
pub mod services;

// Re-export domain entities and engine entry points
pub use domain::*;
pub use error::DomainError;
pub use scoping::{resolve_access, resolve_membership, AccessDecision, UniquenessOutcome};
pub use services::VisionService;

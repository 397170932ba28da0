//! # Vision Core - Domain Module
//!
//! Domain entities for the vision reporting console.

pub mod access_grant;
pub mod client;
pub mod company;
pub mod vision;

// Re-export all entities and enums
pub use access_grant::AccessGrant;
pub use client::Client;
pub use company::Company;
pub use vision::{StoredVision, Vision, VisionDraft, VisionScope, VisionSummary, VisionType};

//! Application-wide constants

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Upper bound on grouping-key ("root") identifiers as stored by the
/// company-management system.
pub const MAX_ROOT_KEY_LENGTH: usize = 64;

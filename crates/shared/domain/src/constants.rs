//! Domain-level constants.

// =============================================================================
// Identity
// =============================================================================

/// Name of the identifier column every entity exposes
pub const ID_COLUMN: &str = "id";

// =============================================================================
// Windowing
// =============================================================================

/// Default number of rows skipped by `find_all`
pub const DEFAULT_OFFSET: u64 = 0;

/// Default number of rows returned by `find_all`
pub const DEFAULT_LIMIT: u64 = 100;

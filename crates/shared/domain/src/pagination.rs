//! Offset/limit windows for list lookups.

use serde::Deserialize;

use crate::constants::{DEFAULT_LIMIT, DEFAULT_OFFSET};

/// Rows to skip and maximum rows to return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Window {
    #[serde(default = "default_offset")]
    pub offset: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_offset() -> u64 {
    DEFAULT_OFFSET
}

fn default_limit() -> u64 {
    DEFAULT_LIMIT
}

impl Window {
    pub fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }

    /// First `limit` rows
    pub fn first(limit: u64) -> Self {
        Self {
            offset: DEFAULT_OFFSET,
            limit,
        }
    }
}

impl Default for Window {
    fn default() -> Self {
        Self {
            offset: DEFAULT_OFFSET,
            limit: DEFAULT_LIMIT,
        }
    }
}

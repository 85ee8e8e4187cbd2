use serde::{Deserialize, Serialize};

pub mod report;
pub mod source;

// Re-exports for convenience
pub use report::*;
pub use source::*;

// Common enums used across the crate

/// How browser automation sessions are shared between concurrent tasks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SessionTopology {
    /// Every task launches and fully owns its own browser (default).
    PerTask,
    /// One browser for the whole process; tasks take turns using it.
    Shared,
}

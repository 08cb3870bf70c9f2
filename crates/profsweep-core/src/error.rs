//! Error types for the sweep engine and its collaborators.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors: either of these stops the run before any profile is touched.
#[derive(Debug, Error)]
pub enum SweepError {
    /// Invoking principal lacks administrative privilege on the host.
    #[error("administrative privilege is required to inspect or remove profiles")]
    NotElevated,
    /// The profile inventory could not be read.
    #[error("failed to read profile inventory: {0}")]
    Inventory(#[from] InventoryError),
}

/// Errors from the profile inventory source.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("profile root '{}' is not readable: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session query failed: {0}")]
    Sessions(String),
}

/// Per-profile deletion failure. Always captured into `Outcome::Failed`.
#[derive(Debug, Error)]
pub enum RemoveError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("refusing to remove '{}': not under the profile root", .0.display())]
    OutsideRoot(PathBuf),
    #[error("{0}")]
    Other(String),
}

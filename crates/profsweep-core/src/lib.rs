#![deny(unused_must_use)]
#![warn(clippy::dbg_macro, clippy::todo, clippy::unimplemented)]
#![forbid(unsafe_code)]

mod error;
mod essential;
pub mod host;
mod sweep;

pub use error::{InventoryError, RemoveError, SweepError};
pub use essential::{EssentialSet, Exemption, ADMIN_PATTERN, DEFAULT_ESSENTIAL};
pub use host::{PrivilegeCheck, ProfileInventory, ProfileRemover, Reporter, SessionIdentity};
pub use sweep::{classify, Decision, SweepReport, Sweeper};

// Model types re-exported so hosts only need one import path.
pub use profsweep_model::{Outcome, Profile, ProfileOutcome, RunMode, RunSummary};

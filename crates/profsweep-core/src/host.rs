//! Collaborator interfaces consumed by the sweep engine.
//!
//! The engine never touches the machine directly. Privilege, identity,
//! enumeration, deletion and reporting are all supplied through these traits,
//! so the classification logic can be driven against constructed inputs.

use crate::error::{InventoryError, RemoveError};
use profsweep_model::{Profile, ProfileOutcome, RunMode, RunSummary};

/// Whether the invoking principal holds administrative privilege.
pub trait PrivilegeCheck {
    fn is_admin(&self) -> bool;
}

/// Identity of the interactive user running the tool.
pub trait SessionIdentity {
    /// Bare username, without any domain prefix or suffix.
    fn current_user(&self) -> String;
}

/// Source of the host's profile snapshot.
pub trait ProfileInventory {
    /// Profiles in host order. Special and loaded profiles may be included;
    /// the engine filters them out.
    fn list_profiles(&self) -> Result<Vec<Profile>, InventoryError>;
}

/// The irreversible deletion primitive.
pub trait ProfileRemover {
    fn remove(&self, profile: &Profile) -> Result<(), RemoveError>;
}

/// Receives run events. Rendering is entirely up to the implementation.
pub trait Reporter {
    /// Emitted once, before the first outcome.
    fn mode_notice(&mut self, mode: RunMode);

    /// Emitted exactly once per candidate profile.
    fn outcome(&mut self, outcome: &ProfileOutcome);

    /// Emitted once after the loop completes.
    fn summary(&mut self, summary: &RunSummary);
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn mode_notice(&mut self, mode: RunMode) {
        (**self).mode_notice(mode)
    }

    fn outcome(&mut self, outcome: &ProfileOutcome) {
        (**self).outcome(outcome)
    }

    fn summary(&mut self, summary: &RunSummary) {
        (**self).summary(summary)
    }
}

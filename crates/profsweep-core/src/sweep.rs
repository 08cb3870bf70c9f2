//! Classify-and-execute loop.
//!
//! A run is one synchronous pass: privilege gate, essential set built once,
//! then each candidate profile is classified and (in remove mode) deleted.
//! A deletion failure becomes that profile's `Outcome::Failed` and the loop
//! moves on; it never aborts the pass.

use tracing::{debug, info, trace, warn};

use crate::error::SweepError;
use crate::essential::{EssentialSet, Exemption};
use crate::host::{PrivilegeCheck, ProfileInventory, ProfileRemover, Reporter, SessionIdentity};
use profsweep_model::{Outcome, Profile, ProfileOutcome, RunMode, RunSummary};

/// What the engine intends to do with one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Skip(Exemption),
    List,
    Remove,
}

/// Pure classification step. Essential profiles are skipped in every mode.
pub fn classify(profile: &Profile, essential: &EssentialSet, mode: RunMode) -> Decision {
    match essential.reason(&profile.name) {
        Some(why) => Decision::Skip(why),
        None => match mode {
            RunMode::List => Decision::List,
            RunMode::Remove => Decision::Remove,
        },
    }
}

/// Everything a completed run produced, in inventory order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepReport {
    pub outcomes: Vec<ProfileOutcome>,
    pub summary: RunSummary,
}

impl SweepReport {
    pub fn outcome_for(&self, name: &str) -> Option<&Outcome> {
        self.outcomes
            .iter()
            .find(|o| o.name == name)
            .map(|o| &o.outcome)
    }
}

/// Drives one run against a set of host collaborators.
pub struct Sweeper<'a> {
    privilege: &'a dyn PrivilegeCheck,
    identity: &'a dyn SessionIdentity,
    inventory: &'a dyn ProfileInventory,
    remover: &'a dyn ProfileRemover,
}

impl std::fmt::Debug for Sweeper<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sweeper").finish_non_exhaustive()
    }
}

impl<'a> Sweeper<'a> {
    pub fn new(
        privilege: &'a dyn PrivilegeCheck,
        identity: &'a dyn SessionIdentity,
        inventory: &'a dyn ProfileInventory,
        remover: &'a dyn ProfileRemover,
    ) -> Self {
        Self {
            privilege,
            identity,
            inventory,
            remover,
        }
    }

    /// Use a single host value that provides every collaborator.
    pub fn with_host<H>(host: &'a H) -> Self
    where
        H: PrivilegeCheck + SessionIdentity + ProfileInventory + ProfileRemover,
    {
        Self::new(host, host, host, host)
    }

    /// Execute one pass.
    ///
    /// Returns `SweepError::NotElevated` before anything is enumerated or
    /// reported when the privilege check fails. Per-profile deletion errors
    /// never surface here; they are recorded as `Outcome::Failed`.
    pub fn run<S: AsRef<str>>(
        &self,
        mode: RunMode,
        keep: &[S],
        reporter: &mut dyn Reporter,
    ) -> Result<SweepReport, SweepError> {
        if !self.privilege.is_admin() {
            return Err(SweepError::NotElevated);
        }

        let current_user = self.identity.current_user();
        let essential = EssentialSet::build(keep, &current_user);
        debug!(
            mode = %mode,
            current_user = %current_user,
            protected = essential.len(),
            "essential set built"
        );

        // A failed inventory read leaves the sink untouched.
        let profiles = self.inventory.list_profiles()?;
        reporter.mode_notice(mode);

        let mut summary = RunSummary::new(mode);
        let mut outcomes = Vec::with_capacity(profiles.len());

        for profile in &profiles {
            if !profile.is_candidate() {
                trace!(
                    profile = %profile.name,
                    special = profile.is_special,
                    loaded = profile.is_loaded,
                    "not a candidate"
                );
                continue;
            }

            let outcome = self.execute(profile, classify(profile, &essential, mode));
            summary.record(&outcome);

            let record = ProfileOutcome::new(profile, outcome);
            reporter.outcome(&record);
            outcomes.push(record);
        }

        info!(
            mode = %mode,
            skipped = summary.skipped,
            listed = summary.listed,
            removed = summary.removed,
            failed = summary.failed,
            "sweep finished"
        );
        reporter.summary(&summary);

        Ok(SweepReport { outcomes, summary })
    }

    fn execute(&self, profile: &Profile, decision: Decision) -> Outcome {
        match decision {
            Decision::Skip(why) => {
                debug!(profile = %profile.name, reason = why.describe(), "skipping essential profile");
                Outcome::Skipped
            }
            Decision::List => Outcome::Listed,
            Decision::Remove => match self.remover.remove(profile) {
                Ok(()) => {
                    info!(profile = %profile.name, path = %profile.path.display(), "profile removed");
                    Outcome::Removed
                }
                Err(e) => {
                    warn!(profile = %profile.name, error = %e, "profile removal failed");
                    Outcome::Failed {
                        detail: e.to_string(),
                    }
                }
            },
        }
    }
}

#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(clippy::dbg_macro, clippy::todo, clippy::unimplemented)]

pub mod profile {
    use serde::{Deserialize, Serialize};
    use std::path::{Path, PathBuf};

    /// One local user profile as reported by the host inventory.
    ///
    /// Snapshots are taken fresh at the start of each run and never cached.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Profile {
        /// Last segment of `path`.
        pub name: String,
        pub path: PathBuf,
        /// OS-reserved or service profile.
        pub is_special: bool,
        /// Currently in use by a session.
        pub is_loaded: bool,
    }

    impl Profile {
        /// Build a profile from its storage path, stripping the profile-root
        /// prefix to obtain the name.
        pub fn from_path(path: impl Into<PathBuf>, is_special: bool, is_loaded: bool) -> Self {
            let path = path.into();
            let name = name_from_path(&path);
            Self {
                name,
                path,
                is_special,
                is_loaded,
            }
        }

        /// Special and loaded profiles are never classified.
        pub fn is_candidate(&self) -> bool {
            !self.is_special && !self.is_loaded
        }
    }

    fn name_from_path(path: &Path) -> String {
        match path.file_name() {
            Some(seg) => seg.to_string_lossy().into_owned(),
            None => path.to_string_lossy().into_owned(),
        }
    }
}

pub mod run {
    use serde::{Deserialize, Serialize};
    use std::fmt;

    /// Whether targets are only reported or actually deleted.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum RunMode {
        #[default]
        List,
        Remove,
    }

    impl RunMode {
        pub fn from_remove_flag(remove: bool) -> Self {
            if remove {
                RunMode::Remove
            } else {
                RunMode::List
            }
        }

        pub fn is_destructive(self) -> bool {
            matches!(self, RunMode::Remove)
        }
    }

    impl fmt::Display for RunMode {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                RunMode::List => f.write_str("list"),
                RunMode::Remove => f.write_str("remove"),
            }
        }
    }
}

pub mod outcome {
    use super::profile::Profile;
    use super::run::RunMode;
    use serde::{Deserialize, Serialize};
    use std::path::PathBuf;

    /// Terminal state of one candidate profile within a run.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(tag = "outcome", rename_all = "snake_case")]
    pub enum Outcome {
        /// Essential; left untouched in either mode.
        Skipped,
        /// Target reported in list mode.
        Listed,
        /// Target deleted in remove mode.
        Removed,
        /// Target whose deletion raised an error.
        Failed { detail: String },
    }

    impl Outcome {
        pub fn label(&self) -> &'static str {
            match self {
                Outcome::Skipped => "skipped",
                Outcome::Listed => "listed",
                Outcome::Removed => "removed",
                Outcome::Failed { .. } => "failed",
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ProfileOutcome {
        pub name: String,
        pub path: PathBuf,
        #[serde(flatten)]
        pub outcome: Outcome,
    }

    impl ProfileOutcome {
        pub fn new(profile: &Profile, outcome: Outcome) -> Self {
            Self {
                name: profile.name.clone(),
                path: profile.path.clone(),
                outcome,
            }
        }
    }

    /// Per-kind counts for a completed run.
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct RunSummary {
        pub mode: RunMode,
        pub skipped: usize,
        pub listed: usize,
        pub removed: usize,
        pub failed: usize,
    }

    impl RunSummary {
        pub fn new(mode: RunMode) -> Self {
            Self {
                mode,
                ..Self::default()
            }
        }

        pub fn record(&mut self, outcome: &Outcome) {
            match outcome {
                Outcome::Skipped => self.skipped += 1,
                Outcome::Listed => self.listed += 1,
                Outcome::Removed => self.removed += 1,
                Outcome::Failed { .. } => self.failed += 1,
            }
        }

        pub fn total(&self) -> usize {
            self.skipped + self.listed + self.removed + self.failed
        }

        /// Partial failure is only visible here; the run itself still completes.
        pub fn has_failures(&self) -> bool {
            self.failed > 0
        }
    }
}

pub use outcome::{Outcome, ProfileOutcome, RunSummary};
pub use profile::Profile;
pub use run::RunMode;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn name_is_last_path_segment() {
        let p = Profile::from_path(PathBuf::from("/home/anw0044"), false, false);
        assert_eq!(p.name, "anw0044");

        let p = Profile::from_path(PathBuf::from("/home/OIT Help Desk"), false, false);
        assert_eq!(p.name, "OIT Help Desk");
    }

    #[test]
    fn special_or_loaded_is_not_candidate() {
        assert!(Profile::from_path("/home/a", false, false).is_candidate());
        assert!(!Profile::from_path("/home/a", true, false).is_candidate());
        assert!(!Profile::from_path("/home/a", false, true).is_candidate());
    }

    #[test]
    fn summary_counts_each_kind() {
        let mut s = RunSummary::new(RunMode::Remove);
        s.record(&Outcome::Skipped);
        s.record(&Outcome::Removed);
        s.record(&Outcome::Removed);
        s.record(&Outcome::Failed {
            detail: "access denied".into(),
        });
        assert_eq!(s.skipped, 1);
        assert_eq!(s.removed, 2);
        assert_eq!(s.failed, 1);
        assert_eq!(s.total(), 4);
        assert!(s.has_failures());
    }

    #[test]
    fn outcome_serializes_with_tag() {
        let p = Profile::from_path("/home/lls0016", false, false);
        let o = ProfileOutcome::new(
            &p,
            Outcome::Failed {
                detail: "in use".into(),
            },
        );
        let v = serde_json::to_value(&o).unwrap();
        assert_eq!(v["name"], "lls0016");
        assert_eq!(v["outcome"], "failed");
        assert_eq!(v["detail"], "in use");

        let listed = serde_json::to_value(ProfileOutcome::new(&p, Outcome::Listed)).unwrap();
        assert_eq!(listed["outcome"], "listed");
        assert!(listed.get("detail").is_none());
    }

    #[test]
    fn mode_from_flag() {
        assert_eq!(RunMode::from_remove_flag(false), RunMode::List);
        assert_eq!(RunMode::from_remove_flag(true), RunMode::Remove);
        assert_eq!(RunMode::Remove.to_string(), "remove");
        assert!(!RunMode::List.is_destructive());
    }
}

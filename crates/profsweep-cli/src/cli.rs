//! Command-line surface and the top-level run.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use profsweep_core::{Reporter, RunMode, SweepReport, Sweeper};

use crate::host::{default_profile_root, SystemHost};
use crate::report::{ConsoleReporter, JsonReporter};

#[derive(Parser, Debug)]
#[command(name = "profsweep", version)]
#[command(about = "List or remove stale local user profiles, preserving essential accounts")]
pub struct Cli {
    /// Delete every non-essential profile (default: list only)
    #[arg(long)]
    pub remove: bool,

    /// Additional profile names to preserve (repeatable or comma-separated)
    #[arg(long, value_name = "NAME", value_delimiter = ',', num_args = 1..)]
    pub keep: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Pretty)]
    pub format: Format,

    /// Directory holding the user profiles
    #[arg(long, value_name = "DIR", env = "PROFSWEEP_PROFILE_ROOT")]
    pub profile_root: Option<PathBuf>,

    /// Raise log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Pretty,
    Json,
}

impl Cli {
    pub fn mode(&self) -> RunMode {
        RunMode::from_remove_flag(self.remove)
    }

    pub fn profile_root(&self) -> PathBuf {
        self.profile_root
            .clone()
            .unwrap_or_else(default_profile_root)
    }
}

/// Run one sweep against the local machine, writing the report to `out`.
pub fn run(cli: &Cli, out: &mut dyn Write) -> Result<SweepReport> {
    let host = SystemHost::new(cli.profile_root());
    let sweeper = Sweeper::with_host(&host);

    match cli.format {
        Format::Pretty => {
            let mut reporter = ConsoleReporter::new(out);
            let report = sweep(&sweeper, cli, &mut reporter)?;
            reporter.finish().context("failed to write report")?;
            Ok(report)
        }
        Format::Json => {
            let mut reporter = JsonReporter::new(out);
            let report = sweep(&sweeper, cli, &mut reporter)?;
            reporter.finish().context("failed to write report")?;
            Ok(report)
        }
    }
}

fn sweep(sweeper: &Sweeper<'_>, cli: &Cli, reporter: &mut dyn Reporter) -> Result<SweepReport> {
    let report = sweeper.run(cli.mode(), &cli.keep, reporter)?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_list_mode() {
        let cli = Cli::try_parse_from(["profsweep"]).unwrap();
        assert_eq!(cli.mode(), RunMode::List);
        assert!(cli.keep.is_empty());
        assert_eq!(cli.format, Format::Pretty);
    }

    #[test]
    fn keep_accepts_repeats_and_commas() {
        let cli = Cli::try_parse_from([
            "profsweep", "--remove", "--keep", "kjs0011,abc0001", "--keep", "OIT Help Desk",
        ])
        .unwrap();
        assert_eq!(cli.mode(), RunMode::Remove);
        assert_eq!(cli.keep, vec!["kjs0011", "abc0001", "OIT Help Desk"]);
    }

    #[test]
    fn explicit_profile_root_wins() {
        let cli = Cli::try_parse_from(["profsweep", "--profile-root", "/srv/profiles", "-vv"])
            .unwrap();
        assert_eq!(cli.profile_root(), PathBuf::from("/srv/profiles"));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn unknown_format_rejected() {
        assert!(Cli::try_parse_from(["profsweep", "--format", "xml"]).is_err());
    }
}

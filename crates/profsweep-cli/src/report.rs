//! Reporting sinks: human-readable console lines and JSONL records.

use std::io::{self, Write};

use profsweep_core::{Outcome, ProfileOutcome, Reporter, RunMode, RunSummary};
use serde::Serialize;

/// Current JSONL report schema version.
pub const REPORT_SCHEMA_VERSION: &str = "0.1";

/// Keeps the first write error so the sweep itself never sees it.
#[derive(Debug)]
struct Sink<W: Write> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> Sink<W> {
    fn new(out: W) -> Self {
        Self { out, error: None }
    }

    fn line(&mut self, args: std::fmt::Arguments<'_>) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = writeln!(self.out, "{}", args) {
            self.error = Some(e);
        }
    }

    fn finish(mut self) -> io::Result<W> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.out.flush()?;
        Ok(self.out)
    }
}

// ---------------------------------------------------------------------------
// ConsoleReporter
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ConsoleReporter<W: Write> {
    sink: Sink<W>,
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            sink: Sink::new(out),
        }
    }

    /// Flush and surface the first write error, if any.
    pub fn finish(self) -> io::Result<W> {
        self.sink.finish()
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn mode_notice(&mut self, mode: RunMode) {
        match mode {
            RunMode::List => self
                .sink
                .line(format_args!("Listing profiles. No changes will be made.")),
            RunMode::Remove => self
                .sink
                .line(format_args!("Removing non-essential profiles.")),
        }
    }

    fn outcome(&mut self, o: &ProfileOutcome) {
        match &o.outcome {
            Outcome::Skipped => self.sink.line(format_args!("  skip     {}", o.name)),
            Outcome::Listed => self
                .sink
                .line(format_args!("  target   {}  ({})", o.name, o.path.display())),
            Outcome::Removed => self.sink.line(format_args!("  removed  {}", o.name)),
            Outcome::Failed { detail } => self
                .sink
                .line(format_args!("  FAILED   {}: {}", o.name, detail)),
        }
    }

    fn summary(&mut self, s: &RunSummary) {
        match s.mode {
            RunMode::Remove => self.sink.line(format_args!(
                "Profile removal complete: {} removed, {} failed, {} skipped.",
                s.removed, s.failed, s.skipped
            )),
            RunMode::List => {
                self.sink.line(format_args!(
                    "{} profile(s) would be removed, {} preserved.",
                    s.listed, s.skipped
                ));
                self.sink.line(format_args!(
                    "Use --keep <NAME> to exclude additional profiles from a --remove run."
                ));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// JsonReporter
// ---------------------------------------------------------------------------

/// One line of the JSONL report.
#[derive(Debug, Serialize)]
#[serde(tag = "record")]
pub enum ReportRecord<'a> {
    #[serde(rename = "header")]
    Header(ReportHeader),
    #[serde(rename = "outcome")]
    Outcome(&'a ProfileOutcome),
    #[serde(rename = "footer")]
    Footer(&'a RunSummary),
}

#[derive(Debug, Serialize)]
pub struct ReportHeader {
    pub schema_version: &'static str,
    pub timestamp: String,
    pub mode: RunMode,
}

#[derive(Debug)]
pub struct JsonReporter<W: Write> {
    sink: Sink<W>,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            sink: Sink::new(out),
        }
    }

    pub fn finish(self) -> io::Result<W> {
        self.sink.finish()
    }

    fn emit(&mut self, record: &ReportRecord<'_>) {
        match serde_json::to_string(record) {
            Ok(json) => self.sink.line(format_args!("{}", json)),
            Err(e) => {
                if self.sink.error.is_none() {
                    self.sink.error = Some(io::Error::other(e));
                }
            }
        }
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn mode_notice(&mut self, mode: RunMode) {
        self.emit(&ReportRecord::Header(ReportHeader {
            schema_version: REPORT_SCHEMA_VERSION,
            timestamp: chrono::Utc::now().to_rfc3339(),
            mode,
        }));
    }

    fn outcome(&mut self, outcome: &ProfileOutcome) {
        self.emit(&ReportRecord::Outcome(outcome));
    }

    fn summary(&mut self, summary: &RunSummary) {
        self.emit(&ReportRecord::Footer(summary));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use profsweep_core::Profile;

    fn outcome(name: &str, outcome: Outcome) -> ProfileOutcome {
        ProfileOutcome::new(&Profile::from_path(format!("/home/{name}"), false, false), outcome)
    }

    fn run_console(mode: RunMode, outcomes: &[ProfileOutcome]) -> String {
        let mut r = ConsoleReporter::new(Vec::new());
        let mut summary = RunSummary::new(mode);
        r.mode_notice(mode);
        for o in outcomes {
            summary.record(&o.outcome);
            r.outcome(o);
        }
        r.summary(&summary);
        String::from_utf8(r.finish().unwrap()).unwrap()
    }

    #[test]
    fn console_list_run_ends_with_keep_hint() {
        let text = run_console(
            RunMode::List,
            &[outcome("anw0044", Outcome::Listed), outcome("Public", Outcome::Skipped)],
        );
        assert!(text.starts_with("Listing profiles"));
        assert!(text.contains("target   anw0044"));
        assert!(text.contains("skip     Public"));
        assert!(text.contains("1 profile(s) would be removed, 1 preserved."));
        assert!(text.trim_end().ends_with("--remove run."));
    }

    #[test]
    fn console_remove_run_reports_failures() {
        let text = run_console(
            RunMode::Remove,
            &[
                outcome("abc0001", Outcome::Removed),
                outcome(
                    "lls0016",
                    Outcome::Failed {
                        detail: "access is denied".into(),
                    },
                ),
            ],
        );
        assert!(text.contains("removed  abc0001"));
        assert!(text.contains("FAILED   lls0016: access is denied"));
        assert!(text.contains("Profile removal complete: 1 removed, 1 failed, 0 skipped."));
        assert!(!text.contains("--keep"));
    }

    #[test]
    fn json_report_has_header_outcomes_footer() {
        let mut r = JsonReporter::new(Vec::new());
        let mut summary = RunSummary::new(RunMode::Remove);
        let o = outcome("anw0044", Outcome::Removed);
        summary.record(&o.outcome);
        r.mode_notice(RunMode::Remove);
        r.outcome(&o);
        r.summary(&summary);
        let text = String::from_utf8(r.finish().unwrap()).unwrap();

        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["record"], "header");
        assert_eq!(lines[0]["schema_version"], REPORT_SCHEMA_VERSION);
        assert_eq!(lines[0]["mode"], "remove");
        assert_eq!(lines[1]["record"], "outcome");
        assert_eq!(lines[1]["name"], "anw0044");
        assert_eq!(lines[1]["outcome"], "removed");
        assert_eq!(lines[2]["record"], "footer");
        assert_eq!(lines[2]["removed"], 1);
    }

    #[derive(Debug)]
    struct Closed;

    impl Write for Closed {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_errors_surface_on_finish() {
        let mut r = ConsoleReporter::new(Closed);
        r.mode_notice(RunMode::List);
        r.outcome(&outcome("anw0044", Outcome::Listed));
        let err = r.finish().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}

//! angle-winrt-gen — generate ANGLE WinRT Visual Studio projects with gyp.
//!
//! Each target in the matrix becomes one gyp invocation. The command line is
//! printed before it runs, and every target runs to completion before the
//! next one starts.
//!
//! # Quick start
//!
//! Generate the stock Windows 8.1 / Windows 10 projects from the current
//! directory:
//!
//! ```no_run
//! use angle_winrt_gen::{config::Config, RunOptions};
//!
//! let reports = angle_winrt_gen::run(
//!     &Config::default(),
//!     &RunOptions::default(),
//!     &mut std::io::stdout(),
//! )
//! .unwrap();
//! assert_eq!(reports.len(), 3);
//! ```

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};

pub mod command;
pub mod config;

use command::GypCommand;
use config::{Config, GypConfig, TargetConfig};

/// How a single gyp invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// gyp exited with a non-zero code.
    Failed(i32),
    /// gyp was killed by a signal.
    Terminated,
    /// gyp could not be started at all.
    SpawnError(String),
    /// Dry run; nothing was started.
    Skipped,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success | Outcome::Skipped)
    }

    fn from_status(status: ExitStatus) -> Self {
        match status.code() {
            Some(0) => Outcome::Success,
            Some(code) => Outcome::Failed(code),
            None => Outcome::Terminated,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => f.write_str("success"),
            Outcome::Failed(code) => write!(f, "gyp exited with code {code}"),
            Outcome::Terminated => f.write_str("gyp was terminated by a signal"),
            Outcome::SpawnError(msg) => write!(f, "failed to start gyp: {msg}"),
            Outcome::Skipped => f.write_str("skipped (dry run)"),
        }
    }
}

/// Result of generating one target.
#[derive(Debug, Clone)]
pub struct TargetReport {
    pub output_dir: PathBuf,
    /// The command line exactly as it was printed.
    pub command: String,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Print the commands without starting gyp.
    pub dry_run: bool,
    /// Stop after the first target that does not succeed.
    pub fail_fast: bool,
    /// Restrict the run to these output directories.  Empty means all.
    pub only: Vec<PathBuf>,
}

/// Generate the projects for one target.
///
/// Writes the destination line and the full command line to `out`, flushes
/// it, then runs gyp and waits for it to exit.  A gyp failure is reported in
/// the returned [`TargetReport`]; only a failure to write to `out` is an
/// error.
pub fn generate_projects<W: Write>(
    gyp: &GypConfig,
    target: &TargetConfig,
    out: &mut W,
    dry_run: bool,
) -> Result<TargetReport> {
    let cmd = GypCommand::new(gyp, target);
    let command = cmd.to_string();

    writeln!(
        out,
        "Generating projects to {} from gyp files...",
        target.output_dir.display()
    )
    .context("writing progress line")?;
    writeln!(out, "{command}").context("writing command line")?;
    out.flush().context("flushing output")?;

    let outcome = if dry_run {
        Outcome::Skipped
    } else {
        execute(&cmd, &target.output_dir)
    };

    Ok(TargetReport {
        output_dir: target.output_dir.clone(),
        command,
        outcome,
    })
}

fn execute(cmd: &GypCommand, output_dir: &Path) -> Outcome {
    debug!(program = %cmd.program().display(), "starting gyp");
    match cmd.to_command().status() {
        Ok(status) => {
            let outcome = Outcome::from_status(status);
            if outcome.is_success() {
                info!(output = %output_dir.display(), "generated projects");
            } else {
                warn!(output = %output_dir.display(), %outcome, "gyp did not succeed");
            }
            outcome
        }
        Err(e) => {
            error!(
                output = %output_dir.display(),
                program = %cmd.program().display(),
                error = %e,
                "failed to start gyp"
            );
            Outcome::SpawnError(e.to_string())
        }
    }
}

/// Run every selected target of `cfg` in order.
///
/// Targets are independent: by default a failing target is logged and the
/// remaining ones still run.  With [`RunOptions::fail_fast`] the first
/// failure aborts the run with an error.
pub fn run<W: Write>(cfg: &Config, opts: &RunOptions, out: &mut W) -> Result<Vec<TargetReport>> {
    debug!(
        angle_dir = %cfg.gyp.angle_dir().display(),
        script_dir = %cfg.gyp.script_dir().display(),
        tool = %cfg.gyp.tool_path().display(),
        "resolved gyp layout"
    );

    for name in &opts.only {
        if !cfg.target.iter().any(|t| &t.output_dir == name) {
            warn!(target = %name.display(), "no target matches --only filter");
        }
    }

    let selected: Vec<&TargetConfig> = cfg
        .target
        .iter()
        .filter(|t| opts.only.is_empty() || opts.only.contains(&t.output_dir))
        .collect();

    info!(
        targets = selected.len(),
        dry_run = opts.dry_run,
        "generating projects"
    );

    let mut reports = Vec::with_capacity(selected.len());
    for target in selected {
        let report = generate_projects(&cfg.gyp, target, out, opts.dry_run)?;
        if opts.fail_fast && !report.outcome.is_success() {
            anyhow::bail!(
                "generating projects to {} failed: {}",
                report.output_dir.display(),
                report.outcome
            );
        }
        reports.push(report);
    }

    let failed = reports.iter().filter(|r| !r.outcome.is_success()).count();
    if failed > 0 {
        warn!(failed, total = reports.len(), "some targets failed");
    }

    Ok(reports)
}

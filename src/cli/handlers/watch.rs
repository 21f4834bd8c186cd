use std::path::Path;
use std::process::{Command, Stdio};

use serde::Serialize;
use tracing::info;

use crate::cli::handlers::snapshot::{capture_dir, to_json};
use crate::cli::ui::{print_diff, print_skipped_during_watch};
use crate::config::GraniteConfig;
use crate::core::{CaptureOptions, SkippedEntry, SnapshotDiff, SnapshotEngine};
use crate::error::{ErrorContext, GraniteError, Result};

/// JSON shape of a watch run: the diff plus whatever either capture skipped
#[derive(Debug, Serialize)]
pub struct WatchReport<'a> {
    #[serde(flatten)]
    pub diff: &'a SnapshotDiff,
    pub skipped_before: &'a [SkippedEntry],
    pub skipped_after: &'a [SkippedEntry],
}

/// Handle `granite watch DIR -- COMMAND...`
///
/// The diff is printed even when the command fails; the failure is reported
/// afterwards as the command's error.
pub fn handle_watch(config: &GraniteConfig, dir: &Path, command: &[String], json: bool) -> Result<()> {
    let (program, args) = command.split_first().ok_or_else(|| GraniteError::Generic {
        message: "no command given to watch".to_string(),
        source: None,
    })?;

    let engine = SnapshotEngine::new(CaptureOptions::from_config(&config.capture)?);
    let before = capture_dir(&engine, config, dir, json)?;

    let shown = command.join(" ");
    info!(command = %shown, dir = %dir.display(), "running watched command");

    let mut child = Command::new(program);
    child.args(args).current_dir(dir);
    if json {
        child.stdout(Stdio::from(std::io::stderr()));
    }
    let status = child
        .status()
        .with_io_context(|| format!("starting '{}'", shown))?;

    let after = capture_dir(&engine, config, dir, json)?;
    let diff = engine.diff(&before, &after);

    if json {
        let report = WatchReport {
            diff: &diff,
            skipped_before: before.skipped(),
            skipped_after: after.skipped(),
        };
        println!("{}", to_json(&report)?);
    } else {
        print_skipped_during_watch(&before, &after, config.ui.colored);
        print_diff(&diff, config.ui.colored);
    }

    if !status.success() {
        return Err(GraniteError::Command {
            command: shown,
            exit_code: status.code(),
        });
    }
    Ok(())
}

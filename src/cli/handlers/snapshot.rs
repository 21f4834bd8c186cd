use std::path::Path;

use serde::Serialize;

use crate::cli::ui::{create_progress_bar, print_snapshot};
use crate::config::GraniteConfig;
use crate::core::{CaptureOptions, Snapshot, SnapshotEngine};
use crate::error::{GraniteError, Result};

/// Handle `granite snapshot DIR`
pub fn handle_snapshot(config: &GraniteConfig, dir: &Path, json: bool) -> Result<()> {
    let engine = SnapshotEngine::new(CaptureOptions::from_config(&config.capture)?);
    let snapshot = capture_dir(&engine, config, dir, json)?;

    if json {
        println!("{}", to_json(&snapshot)?);
    } else {
        print_snapshot(&snapshot, config.ui.colored);
    }
    Ok(())
}

/// Capture `dir`, with a spinner unless output is machine-readable
pub fn capture_dir(
    engine: &SnapshotEngine,
    config: &GraniteConfig,
    dir: &Path,
    json: bool,
) -> Result<Snapshot> {
    let progress = (config.ui.progress_bars && !json)
        .then(|| create_progress_bar(&format!("Capturing {}", dir.display())));

    let result = engine.capture(dir);

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }
    result
}

pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| GraniteError::Generic {
        message: "serializing output as JSON".to_string(),
        source: Some(Box::new(e)),
    })
}

use std::io::{self, stderr, stdout, Write};
use std::time::Duration;

use crossterm::{
    execute,
    style::{Color as CtColor, Print, ResetColor, SetForegroundColor},
};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

use crate::core::{ChangeKind, SkippedEntry, Snapshot, SnapshotDiff};
use crate::error::GraniteError;

/// Print success message
pub fn print_success(message: &str, colored: bool) {
    let _ = write_tagged(&mut stdout(), CtColor::Green, "✅ ", message, colored);
}

/// Print warning message
pub fn print_warning(message: &str, colored: bool) {
    let _ = write_tagged(&mut stdout(), CtColor::Yellow, "⚠️  ", message, colored);
}

/// Print error message to stderr
pub fn print_error(error: &GraniteError, colored: bool) {
    let _ = write_tagged(&mut stderr(), CtColor::Red, "❌ ", &error.to_string(), colored);
}

/// Print info message
pub fn print_info(message: &str, colored: bool) {
    let _ = write_tagged(&mut stdout(), CtColor::Blue, "ℹ️  ", message, colored);
}

fn write_tagged<W: Write>(
    out: &mut W,
    color: CtColor,
    tag: &str,
    message: &str,
    colored: bool,
) -> io::Result<()> {
    if !colored {
        return writeln!(out, "{}{}", tag, message);
    }
    execute!(
        out,
        SetForegroundColor(color),
        Print(tag),
        Print(message),
        Print("\n"),
        ResetColor
    )
}

/// Create a spinner shown while a directory is walked
pub fn create_progress_bar(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.enable_steady_tick(Duration::from_millis(80));
    let style = ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&[
            "▰▱▱▱▱▱",
            "▰▰▱▱▱▱",
            "▰▰▰▱▱▱",
            "▰▰▰▰▱▱",
            "▰▰▰▰▰▱",
            "▰▰▰▰▰▰",
        ]);
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}

/// Marker printed in front of a changed path
pub fn change_marker(kind: ChangeKind) -> char {
    match kind {
        ChangeKind::Added => '+',
        ChangeKind::Removed => '-',
        ChangeKind::Modified => '~',
        ChangeKind::Touched => '*',
    }
}

/// Human readable byte count
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

/// List every file of a snapshot, one per line
pub fn print_snapshot(snapshot: &Snapshot, colored: bool) {
    for record in snapshot.iter() {
        let modified = record.modified.format("%Y-%m-%d %H:%M:%S").to_string();
        if colored {
            println!(
                "{}  {:>10}  {}  {}",
                record.fingerprint.short().dimmed(),
                format_size(record.size),
                modified.blue(),
                record.path
            );
        } else {
            println!(
                "{}  {:>10}  {}  {}",
                record.fingerprint.short(),
                format_size(record.size),
                modified,
                record.path
            );
        }
    }

    print_skipped(snapshot.skipped(), None, colored);
    print_info(
        &format!(
            "{} file(s) captured in {}",
            snapshot.len(),
            snapshot.root().display()
        ),
        colored,
    );
}

/// Warn about entries left out of a snapshot, optionally naming when
pub fn print_skipped(entries: &[SkippedEntry], when: Option<&str>, colored: bool) {
    for entry in entries {
        let message = match when {
            Some(when) => format!("skipped {} {}: {}", entry.path, when, entry.reason),
            None => format!("skipped {}: {}", entry.path, entry.reason),
        };
        print_warning(&message, colored);
    }
}

/// Warn about entries either capture of a watch run left out
pub fn print_skipped_during_watch(before: &Snapshot, after: &Snapshot, colored: bool) {
    print_skipped(before.skipped(), Some("before the command"), colored);
    print_skipped(after.skipped(), Some("after the command"), colored);
}

/// Print a diff grouped by path with one marker per change kind
pub fn print_diff(diff: &SnapshotDiff, colored: bool) {
    if diff.is_empty() {
        print_success("No changes", colored);
        return;
    }

    for (path, kind) in diff.changes() {
        let line = format!("{} {}", change_marker(kind), path);
        if !colored {
            println!("{}", line);
            continue;
        }
        match kind {
            ChangeKind::Added => println!("{}", line.green()),
            ChangeKind::Removed => println!("{}", line.red()),
            ChangeKind::Modified => println!("{}", line.yellow()),
            ChangeKind::Touched => println!("{}", line.cyan()),
        }
    }

    print_info(
        &format!(
            "{} added, {} removed, {} modified, {} touched",
            diff.added().len(),
            diff.removed().len(),
            diff.modified().len(),
            diff.touched().len()
        ),
        colored,
    );
}

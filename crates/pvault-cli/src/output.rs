//! Text and JSON rendering shared by the commands.

use std::fmt::Write;

use colored::{ColoredString, Colorize};
use serde::Serialize;

use pvault_diff::DiffResult;
use pvault_history::ValidationReport;
use pvault_types::{ProcessVersion, VersionEntry, VersionStatus};

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Colored label for a review status.
pub fn status_label(status: VersionStatus) -> ColoredString {
    match status {
        VersionStatus::Draft => status.as_str().dimmed(),
        VersionStatus::Pending => status.as_str().yellow(),
        VersionStatus::Approved => status.as_str().green(),
        VersionStatus::Rejected => status.as_str().red(),
    }
}

/// Render a diff as a legend followed by one line per changed element.
pub fn render_diff(diff: &DiffResult) -> String {
    let mut out = String::new();
    if diff.is_empty() {
        let _ = writeln!(out, "No changes.");
        return out;
    }
    for id in &diff.added {
        let _ = writeln!(out, "  {} {}", "+".green().bold(), id.green());
    }
    for id in &diff.removed {
        let _ = writeln!(out, "  {} {}", "-".red().bold(), id.red());
    }
    for id in &diff.modified {
        let changes = diff
            .details
            .get(id)
            .and_then(|d| d.changes.as_ref())
            .map(|c| c.join(", "))
            .unwrap_or_default();
        let _ = writeln!(out, "  {} {} ({})", "~".yellow().bold(), id.yellow(), changes);
    }
    let _ = writeln!(out, "{}", diff.stats());
    out
}

/// Render a listing entry, either on one line or as a block.
pub fn render_entry(entry: &VersionEntry, oneline: bool) -> String {
    let v = &entry.version;
    let comment = v.comment.as_deref().unwrap_or("");
    if oneline {
        return format!("{} {} {}", v.label().yellow(), v.id.short_id().dimmed(), comment);
    }

    let mut out = String::new();
    let title = entry
        .process_title
        .as_deref()
        .map(|t| format!("  {}", t.bold()))
        .unwrap_or_default();
    let _ = writeln!(out, "{}  {}  [{}]{}", v.label().yellow().bold(), v.id.to_string().dimmed(), status_label(v.status), title);
    let _ = writeln!(out, "  Author: {}", entry.author_display());
    let _ = writeln!(out, "  Date:   {}", v.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
    if !comment.is_empty() {
        let _ = writeln!(out, "  {comment}");
    }
    out
}

/// Render a single version with its metadata.
pub fn render_version(version: &ProcessVersion) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Version {} of process {}", version.label().yellow().bold(), version.process_id.to_string().cyan());
    let _ = writeln!(out, "  Id:      {}", version.id);
    let _ = writeln!(out, "  Status:  {}", status_label(version.status));
    let _ = writeln!(out, "  Author:  {}", version.created_by);
    let _ = writeln!(out, "  Date:    {}", version.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
    if let Some(comment) = &version.comment {
        let _ = writeln!(out, "  Comment: {comment}");
    }
    let size = version.bpmn_xml.as_ref().map_or(0, String::len);
    let _ = writeln!(out, "  Diagram: {size} bytes");
    out
}

/// Render a validation report.
pub fn render_report(report: &ValidationReport) -> String {
    let mut out = String::new();
    let mark = if report.is_valid() { "✓".green().bold() } else { "✗".red().bold() };
    let _ = writeln!(out, "{} {} ({} versions)", mark, report.process.to_string().cyan(), report.version_count);
    let checks = [
        ("Numbers", report.numbers_unique, "unique", "duplicated"),
        ("Sequence", report.sequence_contiguous, "contiguous", "has gaps"),
        ("Timestamps", report.timestamps_monotonic, "monotonic", "regress"),
        ("Pointer", report.pointer_current, "current", "stale"),
    ];
    for (name, ok, good, bad) in checks {
        let state = if ok { good.green() } else { bad.red() };
        let _ = writeln!(out, "  {name}: {state}");
    }
    for violation in &report.violations {
        let _ = writeln!(out, "  {} v{}: {}", "!".yellow(), violation.version_number, violation.description);
    }
    out
}

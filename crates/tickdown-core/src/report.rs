//! Plain-text report generation.
//!
//! Rendering is pure string building over day buckets; only
//! [`write_file`] touches the filesystem. Reports are UTF-8 with a
//! byte-order mark so plain-text editors that sniff for one show task
//! names in non-Latin scripts correctly.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::store::DateKey;
use crate::task::Task;

/// Byte-order mark prepended to report files.
pub const REPORT_BOM: &str = "\u{feff}";

/// Aggregate counts over a set of day buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportTotals {
    pub days: usize,
    pub total: usize,
    pub completed: usize,
}

impl ReportTotals {
    pub fn incomplete(&self) -> usize {
        self.total - self.completed
    }

    /// Completion percentage, rounded half away from zero. Zero tasks
    /// count as zero percent.
    pub fn completion_pct(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.completed as f64 / self.total as f64) * 100.0).round() as u32
    }
}

/// Count days, tasks and completions across `days`.
pub fn totals(days: &BTreeMap<DateKey, Vec<Task>>) -> ReportTotals {
    ReportTotals {
        days: days.len(),
        total: days.values().map(Vec::len).sum(),
        completed: days
            .values()
            .flatten()
            .filter(|task| task.completed)
            .count(),
    }
}

/// Render `days` as a text report: a header naming the user and export
/// time, one dated section per day with its tasks in stored order, and
/// a summary footer with the totals.
pub fn render(days: &BTreeMap<DateKey, Vec<Task>>, user_name: &str, generated_at: DateTime<Local>) -> String {
    let mut out = String::new();
    out.push_str(&format!("TASK REPORT - {}\n", generated_at.format("%Y-%m-%d")));
    out.push_str(&format!("User: {user_name}\n"));
    out.push_str(&format!(
        "Generated: {}\n\n",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str(&"=".repeat(50));
    out.push_str("\n\n");

    for (date, tasks) in days {
        out.push_str(&format!("{}\n", date.0.format("%A, %B %-d, %Y")));
        out.push_str(&"-".repeat(30));
        out.push('\n');
        for (index, task) in tasks.iter().enumerate() {
            let kind = if task.has_timer { "timed" } else { "simple" };
            let time = if task.has_timer {
                fmt_mm_ss(task.duration_secs)
            } else {
                "none".to_string()
            };
            let status = if task.completed {
                "Completed"
            } else {
                "Not completed"
            };
            out.push_str(&format!("{}. {}\n", index + 1, task.name));
            out.push_str(&format!("   Type: {kind}\n"));
            out.push_str(&format!("   Time: {time}\n"));
            out.push_str(&format!("   Status: {status}\n\n"));
        }
        out.push('\n');
    }

    let sums = totals(days);
    out.push_str("SUMMARY\n");
    out.push_str(&"=".repeat(30));
    out.push('\n');
    out.push_str(&format!("Total tasks: {}\n", sums.total));
    out.push_str(&format!("Completed: {}\n", sums.completed));
    out.push_str(&format!("Not completed: {}\n", sums.incomplete()));
    out.push_str(&format!("Completion rate: {}%\n", sums.completion_pct()));
    out
}

/// Date-stamped report file name.
pub fn file_name(date: DateKey) -> String {
    format!("task-report-{date}.txt")
}

/// Write `contents` (BOM-prefixed) into `dir`, creating the directory
/// if needed. Returns the full path of the written file.
///
/// # Errors
/// Propagates filesystem failures.
pub fn write_file(dir: &Path, date: DateKey, contents: &str) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name(date));
    fs::write(&path, format!("{REPORT_BOM}{contents}"))?;
    Ok(path)
}

/// Whole seconds as `M:SS`.
pub fn fmt_mm_ss(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

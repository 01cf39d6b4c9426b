//! Report export and purge commands.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::Local;
use tickdown_core::report;
use tickdown_core::{Config, DateKey, Profile, Task, TaskStore};

use super::common::{confirm, open_kv};

/// Non-destructive export of every bucket dated before today.
pub fn run_report(out: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let kv = open_kv();
    let store = TaskStore::load(kv.as_ref())?;
    let today = DateKey::today();

    let days = store.tasks_before(today);
    if days.is_empty() {
        println!("No tasks from days before {today}.");
        return Ok(());
    }

    let profile = Profile::load(kv.as_ref())?;
    let path = write_report(&days, &profile, out)?;
    let totals = report::totals(&days);
    println!(
        "Exported {} day(s) with {} task(s) to {}",
        totals.days,
        totals.total,
        path.display()
    );
    Ok(())
}

/// Export past-day buckets to a report, then delete them.
pub fn run_purge(yes: bool, out: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let kv = open_kv();
    let mut store = TaskStore::load(kv.as_ref())?;
    let today = DateKey::today();

    let days = store.tasks_before(today);
    if days.is_empty() {
        println!("No tasks from days before {today}.");
        return Ok(());
    }

    let totals = report::totals(&days);
    println!(
        "{} day(s), {} task(s) ({} completed)",
        totals.days, totals.total, totals.completed
    );
    if !yes && !confirm("Export a report and delete these tasks?")? {
        println!("aborted");
        return Ok(());
    }

    // The report is written before anything is deleted; a failed write
    // aborts the purge with the store untouched.
    let profile = Profile::load(kv.as_ref())?;
    let path = write_report(&days, &profile, out)?;

    store.purge_before(today);
    store.save(kv.as_ref())?;
    println!(
        "Purged {} task(s); report at {}",
        totals.total,
        path.display()
    );
    Ok(())
}

fn write_report(
    days: &BTreeMap<DateKey, Vec<Task>>,
    profile: &Profile,
    out: Option<PathBuf>,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let dir = out
        .or(config.report.output_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    let user = profile.user_name.as_deref().unwrap_or("(not set)");
    let contents = report::render(days, user, Local::now());
    let path = report::write_file(&dir, DateKey::today(), &contents)?;
    Ok(path)
}

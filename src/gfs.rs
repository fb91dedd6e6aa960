//! Grandfather-Father-Son keep-set construction.
//!
//! Pure, deterministic: given a newest-first backup list and five slot
//! budgets, returns the set of backup ids that fill at least one GFS slot.

use std::collections::HashSet;

use chrono::Datelike;
use uuid::Uuid;

use crate::model::Backup;

/// Per-granularity slot budgets.
#[derive(Debug, Clone, Copy, Default)]
pub struct GfsBudgets {
    pub hours: u32,
    pub days: u32,
    pub weeks: u32,
    pub months: u32,
    pub years: u32,
}

/// Bucket key for a single granularity class.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum SlotKey {
    Hour(String),
    Day(String),
    Week(String),
    Month(String),
    Year(String),
}

fn hour_key(b: &Backup) -> String {
    b.created_at.format("%Y-%m-%d-%H").to_string()
}

fn day_key(b: &Backup) -> String {
    b.created_at.format("%Y-%m-%d").to_string()
}

/// ISO-8601 week key (`YYYY-Www`). Uses `chrono`'s ISO-week semantics — the
/// week belongs to the year containing its Thursday, not the Gregorian
/// calendar year of the timestamp itself. This is load-bearing around
/// year boundaries: 2025-01-01 is `2025-W01` while 2024-12-28 is `2024-W52`.
fn week_key(b: &Backup) -> String {
    let iso = b.created_at.iso_week();
    format!("{}-W{:02}", iso.year(), iso.week())
}

fn month_key(b: &Backup) -> String {
    b.created_at.format("%Y-%m").to_string()
}

fn year_key(b: &Backup) -> String {
    b.created_at.format("%Y").to_string()
}

/// Compute the GFS keep-set for a newest-first backup list.
///
/// For each backup and each slot class independently: if the class's
/// budget is positive, its kept-count is still below budget, and the
/// backup's key for that class has not been seen yet, the backup is kept by
/// that class — marking the key seen and incrementing the count. A single
/// backup may be kept by multiple classes simultaneously (additive
/// coverage); it only needs to be kept by one to survive.
pub fn keep_set(backups: &[Backup], budgets: GfsBudgets) -> HashSet<Uuid> {
    let mut kept = HashSet::new();
    let mut seen: HashSet<SlotKey> = HashSet::new();
    let mut counts = [0u32; 5]; // hour, day, week, month, year

    for backup in backups {
        let slots: [(u32, u32, SlotKey); 5] = [
            (budgets.hours, counts[0], SlotKey::Hour(hour_key(backup))),
            (budgets.days, counts[1], SlotKey::Day(day_key(backup))),
            (budgets.weeks, counts[2], SlotKey::Week(week_key(backup))),
            (budgets.months, counts[3], SlotKey::Month(month_key(backup))),
            (budgets.years, counts[4], SlotKey::Year(year_key(backup))),
        ];

        for (idx, (budget, count, key)) in slots.into_iter().enumerate() {
            if budget > 0 && count < budget && !seen.contains(&key) {
                seen.insert(key);
                counts[idx] += 1;
                kept.insert(backup.id);
            }
        }
    }

    kept
}

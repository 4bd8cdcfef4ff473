//! Roster history derived from the membership log.
//!
//! The roster table only holds the present. The past is recovered by
//! replaying a project's log entries in creation order.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use staffing_types::{EmployeeId, MembershipAction, MembershipLogEntry};

/// Rebuild a roster by replaying `entries` in creation order.
///
/// Entries are expected to belong to a single project. Ties on
/// `created_at` are broken by entry id.
pub fn replay_log(entries: &[MembershipLogEntry]) -> BTreeSet<EmployeeId> {
    let mut ordered: Vec<&MembershipLogEntry> = entries.iter().collect();
    ordered.sort_by_key(|e| (e.created_at, e.id));
    replay(ordered)
}

/// Roster as of the end of `date`, counting only entries whose effective
/// date is on or before it.
///
/// Entries are replayed by effective date, then creation order. A change
/// recorded late with an earlier effective date therefore takes effect on
/// that earlier date.
pub fn roster_as_of(entries: &[MembershipLogEntry], date: NaiveDate) -> BTreeSet<EmployeeId> {
    let mut ordered: Vec<&MembershipLogEntry> =
        entries.iter().filter(|e| e.effective_date <= date).collect();
    ordered.sort_by_key(|e| (e.effective_date, e.created_at, e.id));
    replay(ordered)
}

fn replay(ordered: Vec<&MembershipLogEntry>) -> BTreeSet<EmployeeId> {
    let mut roster = BTreeSet::new();
    for entry in ordered {
        match entry.action {
            MembershipAction::Added => {
                roster.insert(entry.employee_id);
            }
            MembershipAction::Removed => {
                roster.remove(&entry.employee_id);
            }
        }
    }
    roster
}

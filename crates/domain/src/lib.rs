// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod consistency;
mod diff;
mod directory;
mod error;
mod history;
mod snapshot;
mod stats;
mod types;
mod version;

#[cfg(test)]
mod tests;

// `YYYY-MM-DD` serde adapter for calendar dates, used as `crate::iso_date`.
time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

pub use consistency::{
    InconsistencyIssue, InconsistencyKind, detect_inconsistencies, validate_snapshot,
};
pub use diff::{
    Change, EmployeeDiff, EmployeeReassignment, EntityDiff, StructureDiff, compare_snapshots,
};
pub use directory::{Employee, OrgUnit, OrgUnitChanges, Position, PositionChanges};
pub use error::DomainError;
pub use history::{EmployeeHistoryEntry, HistoryDetails, HistoryEventType, NewHistoryEntry};
pub use snapshot::{Snapshot, SnapshotEmployee, SnapshotOrgUnit, SnapshotPosition};
pub use stats::{GroupCount, SnapshotStats, compute_stats, round_one_decimal};
pub use types::{
    EmploymentStatus, EmploymentType, PublishStatus, PublishStepName, StepStatus, VersionStatus,
    format_iso_date, parse_iso_date,
};
pub use version::{
    NewVersion, OrgStructureVersion, PublishProgress, PublishStep, Reassignment, VersionSummary,
    VersionUpdate, select_version_at,
};

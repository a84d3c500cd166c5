// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Version status string is not recognised.
    InvalidVersionStatus(String),
    /// Publish status string is not recognised.
    InvalidPublishStatus(String),
    /// Publish step name is not recognised.
    InvalidPublishStep(String),
    /// Publish step status string is not recognised.
    InvalidStepStatus(String),
    /// Employment status string is not recognised.
    InvalidEmploymentStatus(String),
    /// Employment type string is not recognised.
    InvalidEmploymentType(String),
    /// History event type string is not recognised.
    InvalidEventType(String),
    /// Version name is empty or invalid.
    InvalidVersionName(String),
    /// The employee does not appear in the snapshot.
    EmployeeNotInSnapshot {
        /// The employee number that was looked up.
        employee_number: String,
    },
    /// The org unit does not appear in the snapshot.
    OrgUnitNotInSnapshot(i64),
    /// The position does not appear in the snapshot.
    PositionNotInSnapshot(i64),
    /// Re-parenting would introduce a cycle in the org unit tree.
    CircularParent {
        /// The org unit being re-parented.
        org_unit_id: i64,
        /// The proposed parent.
        parent_id: i64,
    },
    /// Failed to parse date from string.
    DateParseError {
        /// The invalid date string.
        date_string: String,
        /// The parsing error message.
        error: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidVersionStatus(s) => write!(f, "Invalid version status: {s}"),
            Self::InvalidPublishStatus(s) => write!(f, "Invalid publish status: {s}"),
            Self::InvalidPublishStep(s) => write!(f, "Invalid publish step: {s}"),
            Self::InvalidStepStatus(s) => write!(f, "Invalid publish step status: {s}"),
            Self::InvalidEmploymentStatus(s) => write!(f, "Invalid employment status: {s}"),
            Self::InvalidEmploymentType(s) => write!(f, "Invalid employment type: {s}"),
            Self::InvalidEventType(s) => write!(f, "Invalid history event type: {s}"),
            Self::InvalidVersionName(msg) => write!(f, "Invalid version name: {msg}"),
            Self::EmployeeNotInSnapshot { employee_number } => {
                write!(
                    f,
                    "Employee '{employee_number}' is not part of the version snapshot"
                )
            }
            Self::OrgUnitNotInSnapshot(id) => {
                write!(f, "Org unit {id} is not part of the version snapshot")
            }
            Self::PositionNotInSnapshot(id) => {
                write!(f, "Position {id} is not part of the version snapshot")
            }
            Self::CircularParent {
                org_unit_id,
                parent_id,
            } => {
                write!(
                    f,
                    "Setting parent of org unit {org_unit_id} to {parent_id} would create a cycle"
                )
            }
            Self::DateParseError { date_string, error } => {
                write!(f, "Failed to parse date '{date_string}': {error}")
            }
        }
    }
}

impl std::error::Error for DomainError {}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::Date;
use time::macros::format_description;

/// Lifecycle state of an organizational-structure version.
///
/// Only one version per organization may be `Active` at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VersionStatus {
    /// Freshly created; snapshot and reassignments may still be edited.
    #[default]
    Draft,
    /// The authoritative structure for its organization.
    Active,
    /// Superseded by a later publish.
    Archived,
}

impl VersionStatus {
    /// Converts this status to its persisted string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Archived => "archived",
        }
    }

    /// Checks if a transition from this status to another is valid.
    ///
    /// Valid transitions are:
    /// - `Draft` → `Active` (publish)
    /// - `Active` → `Archived` (superseded)
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Draft, Self::Active) | (Self::Active, Self::Archived)
        )
    }

    /// Returns whether the version may still be edited or deleted.
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Returns whether the version has ever been published.
    #[must_use]
    pub const fn is_published(&self) -> bool {
        matches!(self, Self::Active | Self::Archived)
    }
}

impl FromStr for VersionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "active" => Ok(Self::Active),
            "archived" => Ok(Self::Archived),
            _ => Err(DomainError::InvalidVersionStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Overall state of the publish saga for a version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PublishStatus {
    /// Publish has never been attempted.
    #[default]
    NotStarted,
    /// A publish attempt is running (or crashed mid-way).
    InProgress,
    /// Every step finished.
    Completed,
    /// The last attempt stopped on a step error.
    Failed,
}

impl PublishStatus {
    /// Converts this status to its persisted string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl FromStr for PublishStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(Self::NotStarted),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(DomainError::InvalidPublishStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for PublishStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The four steps of the publish saga, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishStepName {
    /// Archive the organization's previously active version.
    ArchiveOld,
    /// Mark the target version active.
    ActivateNew,
    /// Apply reassignments to live employees.
    UpdateIdentities,
    /// Record employee history entries.
    CreateHistory,
}

impl PublishStepName {
    /// All steps in execution order.
    pub const ALL: [Self; 4] = [
        Self::ArchiveOld,
        Self::ActivateNew,
        Self::UpdateIdentities,
        Self::CreateHistory,
    ];

    /// Converts this step name to its persisted string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ArchiveOld => "archive_old",
            Self::ActivateNew => "activate_new",
            Self::UpdateIdentities => "update_identities",
            Self::CreateHistory => "create_history",
        }
    }
}

impl FromStr for PublishStepName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "archive_old" => Ok(Self::ArchiveOld),
            "activate_new" => Ok(Self::ActivateNew),
            "update_identities" => Ok(Self::UpdateIdentities),
            "create_history" => Ok(Self::CreateHistory),
            _ => Err(DomainError::InvalidPublishStep(s.to_string())),
        }
    }
}

impl std::fmt::Display for PublishStepName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of a single publish step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

impl StepStatus {
    /// Converts this status to its persisted string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl FromStr for StepStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(DomainError::InvalidStepStatus(s.to_string())),
        }
    }
}

/// Employment status of a live employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentStatus {
    Active,
    Probation,
    OnLeave,
    Resigned,
    Terminated,
}

impl EmploymentStatus {
    /// Statuses whose holders are captured in a snapshot.
    pub const SNAPSHOT_ELIGIBLE: [Self; 2] = [Self::Active, Self::Probation];

    /// Converts this status to its persisted string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Probation => "probation",
            Self::OnLeave => "on_leave",
            Self::Resigned => "resigned",
            Self::Terminated => "terminated",
        }
    }

    /// Returns whether an employee with this status belongs in a snapshot.
    #[must_use]
    pub const fn is_snapshot_eligible(&self) -> bool {
        matches!(self, Self::Active | Self::Probation)
    }
}

impl FromStr for EmploymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "probation" => Ok(Self::Probation),
            "on_leave" => Ok(Self::OnLeave),
            "resigned" => Ok(Self::Resigned),
            "terminated" => Ok(Self::Terminated),
            _ => Err(DomainError::InvalidEmploymentStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for EmploymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Contract type of a live employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    Permanent,
    Contract,
    Intern,
    PartTime,
}

impl EmploymentType {
    /// Converts this type to its persisted string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Permanent => "permanent",
            Self::Contract => "contract",
            Self::Intern => "intern",
            Self::PartTime => "part_time",
        }
    }
}

impl FromStr for EmploymentType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "permanent" => Ok(Self::Permanent),
            "contract" => Ok(Self::Contract),
            "intern" => Ok(Self::Intern),
            "part_time" => Ok(Self::PartTime),
            _ => Err(DomainError::InvalidEmploymentType(s.to_string())),
        }
    }
}

impl std::fmt::Display for EmploymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parses a `YYYY-MM-DD` calendar date.
///
/// # Errors
///
/// Returns `DomainError::DateParseError` if the string is not a valid date.
pub fn parse_iso_date(value: &str) -> Result<Date, DomainError> {
    Date::parse(value, format_description!("[year]-[month]-[day]")).map_err(|e| {
        DomainError::DateParseError {
            date_string: value.to_string(),
            error: e.to_string(),
        }
    })
}

/// Formats a calendar date as `YYYY-MM-DD`.
#[must_use]
pub fn format_iso_date(date: Date) -> String {
    // The format is static and every `Date` is representable by it.
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}

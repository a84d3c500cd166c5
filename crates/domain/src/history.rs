// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::{Date, OffsetDateTime};

/// Kind of employee history event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryEventType {
    /// Assignment changed by publishing an organizational-structure version.
    OrgRestructure,
}

impl HistoryEventType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OrgRestructure => "org_restructure",
        }
    }
}

impl FromStr for HistoryEventType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "org_restructure" => Ok(Self::OrgRestructure),
            _ => Err(DomainError::InvalidEventType(s.to_string())),
        }
    }
}

/// Version provenance attached to a restructure history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryDetails {
    pub version_id: i64,
    pub version_number: i32,
    pub sk_number: Option<String>,
}

/// A history entry that has not been persisted yet.
///
/// `(employee_id, event_type, details.version_id)` identifies the entry; a
/// store must refuse to hold two entries with the same key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewHistoryEntry {
    pub employee_id: i64,
    pub event_type: HistoryEventType,
    #[serde(with = "crate::iso_date")]
    pub event_date: Date,
    pub previous_org_unit_id: Option<i64>,
    pub previous_position_id: Option<i64>,
    pub new_org_unit_id: Option<i64>,
    pub new_position_id: Option<i64>,
    pub details: HistoryDetails,
}

/// An append-only employee history record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeHistoryEntry {
    pub history_id: i64,
    pub employee_id: i64,
    pub event_type: HistoryEventType,
    #[serde(with = "crate::iso_date")]
    pub event_date: Date,
    pub previous_org_unit_id: Option<i64>,
    pub previous_position_id: Option<i64>,
    pub new_org_unit_id: Option<i64>,
    pub new_position_id: Option<i64>,
    pub details: HistoryDetails,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

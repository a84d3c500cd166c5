// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Live directory entities.
//!
//! These records are owned by the directory's CRUD collaborators. The
//! versioning engine reads them to build snapshots and only ever writes the
//! assignment fields of an employee, or the fields named in an
//! [`OrgUnitChanges`] / [`PositionChanges`] correction.

use crate::types::{EmploymentStatus, EmploymentType};
use serde::{Deserialize, Serialize};
use time::Date;

/// A live organizational unit (division, department, team, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgUnit {
    pub org_unit_id: i64,
    pub organization_id: i64,
    pub code: String,
    pub name: String,
    /// Parent unit; `None` for a root of the tree.
    pub parent_id: Option<i64>,
    pub unit_type: String,
    pub level: i32,
    pub sort_order: i32,
    pub head_employee_id: Option<i64>,
}

/// A live position (job title).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub position_id: i64,
    pub organization_id: i64,
    pub code: String,
    pub name: String,
    pub level: i32,
    pub grade: String,
}

/// A live employee identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub identity_id: i64,
    pub organization_id: i64,
    /// Human-facing number, unique within the organization.
    pub employee_number: String,
    pub full_name: String,
    pub email: Option<String>,
    pub org_unit_id: Option<i64>,
    pub position_id: Option<i64>,
    pub manager_id: Option<i64>,
    pub employment_type: EmploymentType,
    pub employment_status: EmploymentStatus,
    pub work_location: Option<String>,
    #[serde(with = "crate::iso_date")]
    pub join_date: Date,
}

/// Field changes to apply to an org unit.
///
/// `None` leaves a field untouched. `parent_id: Some(None)` detaches the unit
/// and makes it a root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgUnitChanges {
    pub name: Option<String>,
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Option<i64>>,
    pub unit_type: Option<String>,
}

impl OrgUnitChanges {
    /// Returns `true` if no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.code.is_none()
            && self.parent_id.is_none()
            && self.unit_type.is_none()
    }

    /// Returns `true` if the change touches a field that is denormalized into
    /// snapshot employees.
    #[must_use]
    pub const fn affects_employees(&self) -> bool {
        self.name.is_some() || self.code.is_some()
    }
}

/// Field changes to apply to a position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionChanges {
    pub name: Option<String>,
    pub code: Option<String>,
    pub level: Option<i32>,
    pub grade: Option<String>,
}

impl PositionChanges {
    /// Returns `true` if no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.code.is_none() && self.level.is_none() && self.grade.is_none()
    }

    /// Returns `true` if the change touches a field that is denormalized into
    /// snapshot employees.
    #[must_use]
    pub const fn affects_employees(&self) -> bool {
        self.name.is_some() || self.code.is_some()
    }
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row types and their mapping to domain types.
//!
//! Dates are stored as `YYYY-MM-DD` text, instants as RFC 3339 text, and
//! nested structures (snapshot, reassignments, progress, history details,
//! audit corrections) as JSON text.

use diesel::prelude::*;
use orgstruct_audit::{Action, Actor, AuditEntry, EntityType, FieldChange};
use orgstruct_domain::{
    Employee, EmployeeHistoryEntry, EmploymentStatus, EmploymentType, HistoryDetails,
    HistoryEventType, OrgStructureVersion, OrgUnit, Position, PublishProgress, PublishStatus,
    Reassignment, Snapshot, VersionStatus, parse_iso_date,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::diesel_schema::{
    audit_log, employee_history, employees, org_structure_versions, org_units, organizations,
    positions,
};
use crate::error::{PersistenceError, corrupt};

/// Formats an instant for a text column.
///
/// # Errors
///
/// Returns an error if the instant cannot be represented in RFC 3339.
pub fn format_timestamp(at: OffsetDateTime) -> Result<String, PersistenceError> {
    at.format(&Rfc3339)
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

fn parse_timestamp(table: &'static str, value: &str) -> Result<OffsetDateTime, PersistenceError> {
    OffsetDateTime::parse(value, &Rfc3339).map_err(|e| PersistenceError::CorruptRow {
        table,
        reason: format!("bad timestamp {value:?}: {e}"),
    })
}

/// A tenant of the directory. Versions are numbered per organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Queryable, Selectable)]
#[diesel(table_name = organizations)]
pub struct Organization {
    pub organization_id: i64,
    pub code: String,
    pub name: String,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = org_units)]
pub struct OrgUnitRow {
    pub org_unit_id: i64,
    pub organization_id: i64,
    pub code: String,
    pub name: String,
    pub parent_id: Option<i64>,
    pub unit_type: String,
    pub level: i32,
    pub sort_order: i32,
    pub head_employee_id: Option<i64>,
}

impl From<OrgUnitRow> for OrgUnit {
    fn from(row: OrgUnitRow) -> Self {
        Self {
            org_unit_id: row.org_unit_id,
            organization_id: row.organization_id,
            code: row.code,
            name: row.name,
            parent_id: row.parent_id,
            unit_type: row.unit_type,
            level: row.level,
            sort_order: row.sort_order,
            head_employee_id: row.head_employee_id,
        }
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = positions)]
pub struct PositionRow {
    pub position_id: i64,
    pub organization_id: i64,
    pub code: String,
    pub name: String,
    pub level: i32,
    pub grade: String,
}

impl From<PositionRow> for Position {
    fn from(row: PositionRow) -> Self {
        Self {
            position_id: row.position_id,
            organization_id: row.organization_id,
            code: row.code,
            name: row.name,
            level: row.level,
            grade: row.grade,
        }
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = employees)]
pub struct EmployeeRow {
    pub identity_id: i64,
    pub organization_id: i64,
    pub employee_number: String,
    pub full_name: String,
    pub email: Option<String>,
    pub org_unit_id: Option<i64>,
    pub position_id: Option<i64>,
    pub manager_id: Option<i64>,
    pub employment_type: String,
    pub employment_status: String,
    pub work_location: Option<String>,
    pub join_date: String,
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = PersistenceError;

    fn try_from(row: EmployeeRow) -> Result<Self, Self::Error> {
        Ok(Self {
            identity_id: row.identity_id,
            organization_id: row.organization_id,
            employee_number: row.employee_number,
            full_name: row.full_name,
            email: row.email,
            org_unit_id: row.org_unit_id,
            position_id: row.position_id,
            manager_id: row.manager_id,
            employment_type: EmploymentType::from_str(&row.employment_type)
                .map_err(corrupt("employees"))?,
            employment_status: EmploymentStatus::from_str(&row.employment_status)
                .map_err(corrupt("employees"))?,
            work_location: row.work_location,
            join_date: parse_iso_date(&row.join_date).map_err(corrupt("employees"))?,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = org_structure_versions)]
pub struct VersionRow {
    pub version_id: i64,
    pub organization_id: i64,
    pub version_number: i32,
    pub version_name: String,
    pub effective_date: String,
    pub end_date: Option<String>,
    pub status: String,
    pub structure_json: String,
    pub structure_revision: i32,
    pub reassignments_json: String,
    pub publish_status: String,
    pub publish_progress_json: String,
    pub sk_number: Option<String>,
    pub sk_date: Option<String>,
    pub notes: Option<String>,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<VersionRow> for OrgStructureVersion {
    type Error = PersistenceError;

    fn try_from(row: VersionRow) -> Result<Self, Self::Error> {
        const TABLE: &str = "org_structure_versions";
        let structure: Snapshot = serde_json::from_str(&row.structure_json)?;
        let reassignments: Vec<Reassignment> = serde_json::from_str(&row.reassignments_json)?;
        let publish_progress: PublishProgress = serde_json::from_str(&row.publish_progress_json)?;

        Ok(Self {
            version_id: row.version_id,
            organization_id: row.organization_id,
            version_number: row.version_number,
            version_name: row.version_name,
            effective_date: parse_iso_date(&row.effective_date).map_err(corrupt(TABLE))?,
            end_date: row
                .end_date
                .as_deref()
                .map(parse_iso_date)
                .transpose()
                .map_err(corrupt(TABLE))?,
            status: VersionStatus::from_str(&row.status).map_err(corrupt(TABLE))?,
            structure,
            structure_revision: row.structure_revision,
            reassignments,
            publish_status: PublishStatus::from_str(&row.publish_status)
                .map_err(corrupt(TABLE))?,
            publish_progress,
            sk_number: row.sk_number,
            sk_date: row
                .sk_date
                .as_deref()
                .map(parse_iso_date)
                .transpose()
                .map_err(corrupt(TABLE))?,
            notes: row.notes,
            created_by: row.created_by,
            created_at: parse_timestamp(TABLE, &row.created_at)?,
            updated_at: parse_timestamp(TABLE, &row.updated_at)?,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = employee_history)]
pub struct HistoryRow {
    pub history_id: i64,
    pub employee_id: i64,
    pub event_type: String,
    pub event_date: String,
    pub previous_org_unit_id: Option<i64>,
    pub previous_position_id: Option<i64>,
    pub new_org_unit_id: Option<i64>,
    pub new_position_id: Option<i64>,
    pub version_id: i64,
    pub details_json: String,
    pub created_at: String,
}

impl TryFrom<HistoryRow> for EmployeeHistoryEntry {
    type Error = PersistenceError;

    fn try_from(row: HistoryRow) -> Result<Self, Self::Error> {
        const TABLE: &str = "employee_history";
        let details: HistoryDetails = serde_json::from_str(&row.details_json)?;
        if details.version_id != row.version_id {
            return Err(PersistenceError::CorruptRow {
                table: TABLE,
                reason: format!(
                    "history {} details name version {} but row names {}",
                    row.history_id, details.version_id, row.version_id
                ),
            });
        }

        Ok(Self {
            history_id: row.history_id,
            employee_id: row.employee_id,
            event_type: HistoryEventType::from_str(&row.event_type).map_err(corrupt(TABLE))?,
            event_date: parse_iso_date(&row.event_date).map_err(corrupt(TABLE))?,
            previous_org_unit_id: row.previous_org_unit_id,
            previous_position_id: row.previous_position_id,
            new_org_unit_id: row.new_org_unit_id,
            new_position_id: row.new_position_id,
            details,
            created_at: parse_timestamp(TABLE, &row.created_at)?,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = audit_log)]
pub struct AuditRow {
    pub audit_id: i64,
    pub actor_id: String,
    pub actor_type: String,
    pub action_name: String,
    pub action_details: Option<String>,
    pub entity_type: String,
    pub entity_id: i64,
    pub version_id: i64,
    pub corrections_json: String,
    pub created_at: String,
}

impl TryFrom<AuditRow> for AuditEntry {
    type Error = PersistenceError;

    fn try_from(row: AuditRow) -> Result<Self, Self::Error> {
        const TABLE: &str = "audit_log";
        let corrections: Vec<FieldChange> = serde_json::from_str(&row.corrections_json)?;
        let entity_type: EntityType =
            EntityType::parse(&row.entity_type).ok_or_else(|| PersistenceError::CorruptRow {
                table: TABLE,
                reason: format!("unknown entity type {:?}", row.entity_type),
            })?;

        Ok(Self {
            actor: Actor::new(row.actor_id, row.actor_type),
            action: Action::new(row.action_name, row.action_details),
            entity_type,
            entity_id: row.entity_id,
            version_id: row.version_id,
            corrections,
            created_at: parse_timestamp(TABLE, &row.created_at)?,
        })
    }
}

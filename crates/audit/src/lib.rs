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
    clippy::all
)]

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Action name recorded for every snapshot correction.
pub const VERSION_CORRECTION: &str = "version_correction";

/// Represents the entity performing an action.
///
/// An actor is any identifiable entity that initiates a state change.
/// This could be an operator, a system process, or an automated job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The type of actor (e.g., "user", "system").
    pub actor_type: String,
}

impl Actor {
    /// Creates a new Actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `actor_type` - The type of actor
    #[must_use]
    pub const fn new(id: String, actor_type: String) -> Self {
        Self { id, actor_type }
    }

    /// The actor used when no caller identity is available.
    #[must_use]
    pub fn system() -> Self {
        Self::new(String::from("system"), String::from("system"))
    }
}

/// Represents the specific action performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// The name of the action (e.g., "`version_correction`").
    pub name: String,
    /// Optional additional details, such as the correction operation.
    pub details: Option<String>,
}

impl Action {
    /// Creates a new Action.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the action
    /// * `details` - Optional additional details
    #[must_use]
    pub const fn new(name: String, details: Option<String>) -> Self {
        Self { name, details }
    }
}

/// Kind of entity a correction touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    /// The snapshot of a version as a whole.
    VersionSnapshot,
    /// One employee inside a snapshot.
    SnapshotEmployee,
    /// An org unit (snapshot entry and live record).
    OrgUnit,
    /// A position (snapshot entry and live record).
    Position,
}

impl EntityType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::VersionSnapshot => "version_snapshot",
            Self::SnapshotEmployee => "snapshot_employee",
            Self::OrgUnit => "org_unit",
            Self::Position => "position",
        }
    }

    /// Parses the persisted representation.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "version_snapshot" => Some(Self::VersionSnapshot),
            "snapshot_employee" => Some(Self::SnapshotEmployee),
            "org_unit" => Some(Self::OrgUnit),
            "position" => Some(Self::Position),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single field's value before and after a correction.
///
/// Values are rendered as strings; `None` means the field had no value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub before: Option<String>,
    pub after: Option<String>,
}

impl FieldChange {
    #[must_use]
    pub fn new(field: &str, before: Option<String>, after: Option<String>) -> Self {
        Self {
            field: String::from(field),
            before,
            after,
        }
    }

    /// Builds a change only when the rendered values differ.
    #[must_use]
    pub fn between<T: ToString + PartialEq>(
        field: &str,
        before: Option<&T>,
        after: Option<&T>,
    ) -> Option<Self> {
        if before == after {
            return None;
        }
        Some(Self::new(
            field,
            before.map(ToString::to_string),
            after.map(ToString::to_string),
        ))
    }
}

/// An immutable audit entry describing one correction.
///
/// Entries are append-only. They record:
/// - Who performed the correction (actor)
/// - What was done (action)
/// - Which entity of which version was touched
/// - The individual field changes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub actor: Actor,
    pub action: Action,
    pub entity_type: EntityType,
    pub entity_id: i64,
    pub version_id: i64,
    pub corrections: Vec<FieldChange>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl AuditEntry {
    /// Creates a `version_correction` entry.
    ///
    /// # Arguments
    ///
    /// * `actor` - Who made the correction
    /// * `operation` - The correction operation, kept as action details
    /// * `entity_type` - Kind of entity that changed
    /// * `entity_id` - Identifier of that entity
    /// * `version_id` - The version whose snapshot was corrected
    /// * `corrections` - Field-level changes
    /// * `created_at` - When the correction happened
    #[must_use]
    pub fn version_correction(
        actor: Actor,
        operation: &str,
        entity_type: EntityType,
        entity_id: i64,
        version_id: i64,
        corrections: Vec<FieldChange>,
        created_at: OffsetDateTime,
    ) -> Self {
        Self {
            actor,
            action: Action::new(
                String::from(VERSION_CORRECTION),
                Some(String::from(operation)),
            ),
            entity_type,
            entity_id,
            version_id,
            corrections,
            created_at,
        }
    }
}

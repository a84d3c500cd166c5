// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use clap::Subcommand;
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, eyre};
use orgstruct::{
    Corrector, EmployeeCorrection, EmployeeHistoryFilter, NewVersionRequest, PublishOutcome,
    Publisher, QueryHelper, ReassignmentRequest, VersionManager,
};
use orgstruct_audit::Actor;
use orgstruct_domain::{
    EmploymentStatus, OrgStructureVersion, OrgUnitChanges, PositionChanges, VersionStatus,
    VersionUpdate, parse_iso_date,
};
use orgstruct_persistence::{DirectoryImport, Persistence};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use time::Date;
use tracing::{info, warn};

pub fn parse_date(value: &str) -> Result<Date, String> {
    parse_iso_date(value).map_err(|e| e.to_string())
}

fn parse_version_status(value: &str) -> Result<VersionStatus, String> {
    VersionStatus::from_str(value).map_err(|e| e.to_string())
}

fn parse_employment_status(value: &str) -> Result<EmploymentStatus, String> {
    EmploymentStatus::from_str(value).map_err(|e| e.to_string())
}

/// Acknowledgement for commands whose engine call returns nothing useful.
#[derive(Debug, Serialize)]
struct Done {
    version_id: i64,
    action: &'static str,
    changed: bool,
}

#[derive(Debug, Serialize)]
struct AutoFixed {
    version_id: i64,
    removed: usize,
}

fn emit<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).wrap_err("cannot serialize output")?;
    writeln!(out)?;
    Ok(())
}

#[derive(Clone, Debug, Subcommand)]
pub enum Command {
    /// Load organizations, units, positions and employees from a JSON dump
    Import {
        /// Path to the JSON file
        file: PathBuf,
    },

    /// Capture the live directory as a new draft version
    #[command(visible_alias = "create")]
    CreateVersion {
        #[arg(long)]
        organization: i64,
        #[arg(long)]
        name: String,
        /// YYYY-MM-DD
        #[arg(long, value_parser = parse_date)]
        effective_date: Date,
        #[arg(long)]
        sk_number: Option<String>,
        #[arg(long, value_parser = parse_date)]
        sk_date: Option<Date>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long, default_value = "cli")]
        created_by: String,
    },

    /// Edit a draft's metadata
    UpdateVersion {
        version_id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, value_parser = parse_date)]
        effective_date: Option<Date>,
        #[arg(long)]
        sk_number: Option<String>,
        #[arg(long, value_parser = parse_date)]
        sk_date: Option<Date>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Delete a draft
    DeleteVersion { version_id: i64 },

    /// Propose moving an employee in a draft
    Propose {
        version_id: i64,
        #[arg(long)]
        employee: String,
        #[arg(long)]
        org_unit: Option<i64>,
        #[arg(long)]
        position: Option<i64>,
        #[arg(long, default_value = "")]
        reason: String,
    },

    /// Withdraw a proposed move
    Withdraw {
        version_id: i64,
        #[arg(long)]
        employee: String,
    },

    /// Publish a version
    #[command(visible_alias = "p")]
    Publish { version_id: i64 },

    /// Retry a publish that started but did not complete
    Resume { version_id: i64 },

    /// List an organization's versions
    #[command(visible_alias = "ls")]
    Versions {
        #[arg(long)]
        organization: i64,
        #[arg(long, value_parser = parse_version_status)]
        status: Option<VersionStatus>,
    },

    /// Show one version, snapshot included
    Show { version_id: i64 },

    /// Snapshot of the active version in force on a date
    StructureAt {
        #[arg(long)]
        organization: i64,
        #[arg(long, value_parser = parse_date)]
        date: Date,
    },

    /// Where an employee sat on a date
    AssignmentAt {
        #[arg(long)]
        employee: String,
        #[arg(long, value_parser = parse_date)]
        date: Date,
    },

    /// Members of an org unit as captured by a version
    Members {
        version_id: i64,
        #[arg(long)]
        org_unit: i64,
    },

    /// Published versions in which an employee belonged to a unit
    Timeline {
        #[arg(long)]
        identity: i64,
        #[arg(long)]
        org_unit: i64,
    },

    /// Every version containing an employee
    History {
        #[arg(long)]
        identity: i64,
        #[arg(long)]
        org_unit: Option<i64>,
        #[arg(long)]
        position: Option<i64>,
        #[arg(long, value_parser = parse_employment_status)]
        employment_status: Option<EmploymentStatus>,
        #[arg(long, value_parser = parse_date)]
        from: Option<Date>,
        #[arg(long, value_parser = parse_date)]
        to: Option<Date>,
    },

    /// Structural diff between two versions
    Compare { from: i64, to: i64 },

    /// Headcount aggregates of a version
    Stats { version_id: i64 },

    /// Report snapshot defects
    Detect { version_id: i64 },

    /// Remove orphaned employees from a snapshot
    AutoFix {
        version_id: i64,
        #[arg(long, default_value = "cli")]
        actor: String,
    },

    /// Patch one employee inside a snapshot
    CorrectEmployee {
        version_id: i64,
        #[arg(long)]
        identity: i64,
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        org_unit: Option<i64>,
        #[arg(long)]
        position: Option<i64>,
        #[arg(long)]
        manager: Option<i64>,
        #[arg(long, value_parser = parse_employment_status)]
        employment_status: Option<EmploymentStatus>,
        #[arg(long)]
        work_location: Option<String>,
        #[arg(long, default_value = "cli")]
        actor: String,
    },

    /// Change an org unit in a snapshot and in the live directory
    SyncOrgUnit {
        version_id: i64,
        #[arg(long)]
        org_unit: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        code: Option<String>,
        /// New parent id; 0 detaches the unit
        #[arg(long)]
        parent: Option<i64>,
        #[arg(long)]
        unit_type: Option<String>,
        #[arg(long, default_value = "cli")]
        actor: String,
    },

    /// Change a position in a snapshot and in the live directory
    SyncPosition {
        version_id: i64,
        #[arg(long)]
        position: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        code: Option<String>,
        #[arg(long)]
        level: Option<i32>,
        #[arg(long)]
        grade: Option<String>,
        #[arg(long, default_value = "cli")]
        actor: String,
    },
}

fn user(actor: String) -> Actor {
    Actor::new(actor, String::from("user"))
}

impl Command {
    /// Runs the command and writes its JSON result to `out`.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine rejects the operation, the store
    /// fails, or a publish step fails.
    #[allow(clippy::too_many_lines)]
    pub fn run<W: Write>(self, persistence: &mut Persistence, out: &mut W) -> Result<()> {
        match self {
            Self::Import { file } => {
                let raw: String = std::fs::read_to_string(&file)
                    .wrap_err_with(|| format!("cannot read {}", file.display()))?;
                let import: DirectoryImport =
                    serde_json::from_str(&raw).wrap_err("invalid directory dump")?;
                emit(out, &persistence.import_directory(&import)?)
            }
            Self::CreateVersion {
                organization,
                name,
                effective_date,
                sk_number,
                sk_date,
                notes,
                created_by,
            } => {
                let created = VersionManager::new(persistence).create_version(NewVersionRequest {
                    organization_id: organization,
                    version_name: name,
                    effective_date,
                    notes,
                    sk_number,
                    sk_date,
                    created_by,
                })?;
                for warning in &created.warnings {
                    warn!(version_id = created.version_id, "{warning}");
                }
                emit(out, &created)
            }
            Self::UpdateVersion {
                version_id,
                name,
                effective_date,
                sk_number,
                sk_date,
                notes,
            } => {
                let update: VersionUpdate = VersionUpdate {
                    version_name: name,
                    effective_date,
                    notes,
                    sk_number,
                    sk_date,
                    reassignments: None,
                };
                let updated =
                    VersionManager::new(persistence).update_version(version_id, &update)?;
                emit(out, &updated.summary())
            }
            Self::DeleteVersion { version_id } => {
                VersionManager::new(persistence).delete_version(version_id)?;
                emit(
                    out,
                    &Done {
                        version_id,
                        action: "delete",
                        changed: true,
                    },
                )
            }
            Self::Propose {
                version_id,
                employee,
                org_unit,
                position,
                reason,
            } => {
                let reassignment = VersionManager::new(persistence).propose_reassignment(
                    version_id,
                    ReassignmentRequest {
                        employee_number: employee,
                        new_org_unit_id: org_unit,
                        new_position_id: position,
                        reason,
                    },
                )?;
                emit(out, &reassignment)
            }
            Self::Withdraw { version_id, employee } => {
                let changed: bool = VersionManager::new(persistence)
                    .withdraw_reassignment(version_id, &employee)?;
                emit(
                    out,
                    &Done {
                        version_id,
                        action: "withdraw",
                        changed,
                    },
                )
            }
            Self::Publish { version_id } => {
                let outcome: PublishOutcome =
                    Publisher::new(persistence).publish_version(version_id)?;
                report_publish(out, version_id, &outcome)
            }
            Self::Resume { version_id } => {
                let outcome: PublishOutcome =
                    Publisher::new(persistence).resume_publish(version_id)?;
                report_publish(out, version_id, &outcome)
            }
            Self::Versions {
                organization,
                status,
            } => {
                let summaries: Vec<_> = VersionManager::new(persistence)
                    .get_all_versions(organization)?
                    .iter()
                    .filter(|v| status.is_none_or(|s| v.status == s))
                    .map(OrgStructureVersion::summary)
                    .collect();
                emit(out, &summaries)
            }
            Self::Show { version_id } => {
                emit(out, &VersionManager::new(persistence).get_version(version_id)?)
            }
            Self::StructureAt { organization, date } => emit(
                out,
                &QueryHelper::new(persistence).get_org_structure_at(organization, date)?,
            ),
            Self::AssignmentAt { employee, date } => emit(
                out,
                &QueryHelper::new(persistence).get_employee_assignment_at(&employee, date)?,
            ),
            Self::Members { version_id, org_unit } => emit(
                out,
                &QueryHelper::new(persistence).get_org_unit_members_at(org_unit, version_id)?,
            ),
            Self::Timeline { identity, org_unit } => emit(
                out,
                &QueryHelper::new(persistence).get_employee_timeline_in_unit(identity, org_unit)?,
            ),
            Self::History {
                identity,
                org_unit,
                position,
                employment_status,
                from,
                to,
            } => {
                let filter: EmployeeHistoryFilter = EmployeeHistoryFilter {
                    org_unit_id: org_unit,
                    position_id: position,
                    employment_status,
                    effective_from: from,
                    effective_to: to,
                };
                emit(
                    out,
                    &QueryHelper::new(persistence).search_employee_history(identity, &filter)?,
                )
            }
            Self::Compare { from, to } => {
                emit(out, &QueryHelper::new(persistence).compare_versions(from, to)?)
            }
            Self::Stats { version_id } => {
                emit(out, &QueryHelper::new(persistence).get_version_stats(version_id)?)
            }
            Self::Detect { version_id } => {
                emit(out, &Corrector::new(persistence).detect_inconsistencies(version_id)?)
            }
            Self::AutoFix { version_id, actor } => {
                let removed: usize = Corrector::new(persistence)
                    .acting_as(user(actor))
                    .auto_fix_inconsistencies(version_id)?;
                emit(
                    out,
                    &AutoFixed {
                        version_id,
                        removed,
                    },
                )
            }
            Self::CorrectEmployee {
                version_id,
                identity,
                full_name,
                email,
                org_unit,
                position,
                manager,
                employment_status,
                work_location,
                actor,
            } => {
                let correction: EmployeeCorrection = EmployeeCorrection {
                    full_name,
                    email,
                    org_unit_id: org_unit,
                    position_id: position,
                    manager_id: manager,
                    employment_status,
                    work_location,
                };
                let report = Corrector::new(persistence)
                    .acting_as(user(actor))
                    .correct_employee_in_snapshot(version_id, identity, &correction)?;
                emit(out, &report)
            }
            Self::SyncOrgUnit {
                version_id,
                org_unit,
                name,
                code,
                parent,
                unit_type,
                actor,
            } => {
                let changes: OrgUnitChanges = OrgUnitChanges {
                    name,
                    code,
                    parent_id: parent.map(|id| (id != 0).then_some(id)),
                    unit_type,
                };
                let report = Corrector::new(persistence)
                    .acting_as(user(actor))
                    .sync_org_unit_changes(version_id, org_unit, &changes)?;
                emit(out, &report)
            }
            Self::SyncPosition {
                version_id,
                position,
                name,
                code,
                level,
                grade,
                actor,
            } => {
                let changes: PositionChanges = PositionChanges {
                    name,
                    code,
                    level,
                    grade,
                };
                let report = Corrector::new(persistence)
                    .acting_as(user(actor))
                    .sync_position_changes(version_id, position, &changes)?;
                emit(out, &report)
            }
        }
    }
}

/// Prints the outcome. A failed step is an error exit; the recorded
/// progress stays on the version for `resume`.
fn report_publish<W: Write>(out: &mut W, version_id: i64, outcome: &PublishOutcome) -> Result<()> {
    emit(out, outcome)?;
    match outcome {
        PublishOutcome::Failed { step, error } => Err(eyre!(
            "publish of version {version_id} failed at {step}: {error}"
        )),
        PublishOutcome::Published(report) => {
            info!(
                version_id,
                identities_updated = report.identities_updated,
                "Published"
            );
            Ok(())
        }
        PublishOutcome::AlreadyPublished => Ok(()),
    }
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The publish saga.
//!
//! Publishing runs four steps in order: archive the previously active
//! version, activate the target, apply reassignments to live employees and
//! record employee history. Every write is conditional on current state, so
//! a publish that stopped half-way is finished by simply calling it again.
//! Progress is persisted after every step.

use crate::error::{StoreError, VersionError};
use crate::store::{DirectoryStore, HistoryStore, VersionStore};
use orgstruct_domain::{
    Employee, HistoryDetails, HistoryEventType, NewHistoryEntry, OrgStructureVersion,
    PublishProgress, PublishStatus, PublishStepName, Reassignment, VersionStatus,
};
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, error, info, warn};

/// Counts from a successful publish attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PublishReport {
    pub version_id: i64,
    /// Live employees whose assignment was written by this attempt.
    pub identities_updated: u32,
    /// History entries inserted by this attempt.
    pub history_entries_created: u32,
    /// Employee numbers of reassignments whose employee no longer exists.
    pub skipped_employees: Vec<String>,
    /// Versions archived by this attempt.
    pub archived_versions: Vec<i64>,
}

/// Result of a publish call that reached the saga.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PublishOutcome {
    Published(PublishReport),
    /// The version was already active with a completed publish; nothing ran.
    AlreadyPublished,
    /// A step failed. The failure is recorded on the version; call again to
    /// retry.
    Failed {
        step: PublishStepName,
        error: String,
    },
}

/// Returns whether `version` must be archived when `target_version_id` is
/// published.
#[must_use]
pub fn needs_archive(version: &OrgStructureVersion, target_version_id: i64) -> bool {
    version.status == VersionStatus::Active && version.version_id != target_version_id
}

/// Returns whether `version` still has to be activated.
#[must_use]
pub fn needs_activation(version: &OrgStructureVersion) -> bool {
    version.status != VersionStatus::Active
}

/// Returns whether the live employee already holds the reassignment's
/// target org unit and position.
#[must_use]
pub fn assignment_is_current(employee: &Employee, reassignment: &Reassignment) -> bool {
    employee.org_unit_id == reassignment.new_org_unit_id
        && employee.position_id == reassignment.new_position_id
}

struct StepFailure(String);

impl From<StoreError> for StepFailure {
    fn from(err: StoreError) -> Self {
        Self(err.to_string())
    }
}

fn aggregate(failures: &[String], total: usize, what: &str) -> Result<(), StepFailure> {
    if failures.is_empty() {
        return Ok(());
    }
    Err(StepFailure(format!(
        "{} of {total} {what} failed: {}",
        failures.len(),
        failures.join("; ")
    )))
}

/// Runs the publish saga against a store.
pub struct Publisher<'a, S> {
    store: &'a mut S,
    now: OffsetDateTime,
}

impl<'a, S: DirectoryStore + VersionStore + HistoryStore> Publisher<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self::at(store, OffsetDateTime::now_utc())
    }

    pub const fn at(store: &'a mut S, now: OffsetDateTime) -> Self {
        Self { store, now }
    }

    /// Publishes a version, or finishes an earlier attempt.
    ///
    /// A version that is already active with a completed publish returns
    /// [`PublishOutcome::AlreadyPublished`] without writing anything. A
    /// step failure is recorded on the version and returned as
    /// [`PublishOutcome::Failed`].
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the version does not exist, `InvalidState` if
    /// it is archived, and a store error if publish state cannot be saved.
    pub fn publish_version(&mut self, version_id: i64) -> Result<PublishOutcome, VersionError> {
        let version: OrgStructureVersion = self.load(version_id)?;

        if version.status == VersionStatus::Active
            && version.publish_status == PublishStatus::Completed
        {
            info!(version_id, "Version already published");
            return Ok(PublishOutcome::AlreadyPublished);
        }
        if version.status == VersionStatus::Archived {
            return Err(VersionError::InvalidState(format!(
                "version {version_id} is archived and cannot be published"
            )));
        }

        self.run(&version)
    }

    /// Re-runs a publish that was started but did not complete.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if publishing never started or already
    /// completed, otherwise as [`Self::publish_version`].
    pub fn resume_publish(&mut self, version_id: i64) -> Result<PublishOutcome, VersionError> {
        let version: OrgStructureVersion = self.load(version_id)?;
        match version.publish_status {
            PublishStatus::NotStarted => Err(VersionError::InvalidState(format!(
                "version {version_id} has never been published; use publish instead"
            ))),
            PublishStatus::Completed => Err(VersionError::InvalidState(format!(
                "publish of version {version_id} already completed"
            ))),
            PublishStatus::InProgress | PublishStatus::Failed => {
                info!(
                    version_id,
                    publish_status = %version.publish_status,
                    "Resuming publish"
                );
                self.publish_version(version_id)
            }
        }
    }

    fn load(&mut self, version_id: i64) -> Result<OrgStructureVersion, VersionError> {
        self.store
            .find_version(version_id)?
            .ok_or_else(|| VersionError::version_not_found(version_id))
    }

    fn run(&mut self, version: &OrgStructureVersion) -> Result<PublishOutcome, VersionError> {
        let version_id: i64 = version.version_id;
        let mut progress: PublishProgress = PublishProgress::initialized();
        self.store
            .save_publish_state(version_id, PublishStatus::InProgress, &progress, self.now)?;
        info!(
            version_id,
            organization_id = version.organization_id,
            reassignments = version.reassignments.len(),
            "Publish started"
        );

        let mut report: PublishReport = PublishReport {
            version_id,
            ..PublishReport::default()
        };

        for step in PublishStepName::ALL {
            let result: Result<(), StepFailure> = match step {
                PublishStepName::ArchiveOld => self.archive_old(version, &mut report),
                PublishStepName::ActivateNew => self.activate_new(version),
                PublishStepName::UpdateIdentities => self.update_identities(version, &mut report),
                PublishStepName::CreateHistory => self.create_history(version, &mut report),
            };

            progress.total_identities_updated = report.identities_updated;
            progress.total_history_entries_created = report.history_entries_created;

            if let Err(StepFailure(message)) = result {
                error!(version_id, step = %step, error = %message, "Publish step failed");
                progress.fail_step(step, message.clone());
                self.store
                    .save_publish_state(version_id, PublishStatus::Failed, &progress, self.now)?;
                return Ok(PublishOutcome::Failed {
                    step,
                    error: message,
                });
            }

            progress.complete_step(step, self.now);
            self.store
                .save_publish_state(version_id, PublishStatus::InProgress, &progress, self.now)?;
            debug!(version_id, step = %step, "Publish step completed");
        }

        self.store
            .save_publish_state(version_id, PublishStatus::Completed, &progress, self.now)?;
        info!(
            version_id,
            identities_updated = report.identities_updated,
            history_entries_created = report.history_entries_created,
            skipped = report.skipped_employees.len(),
            "Publish completed"
        );
        Ok(PublishOutcome::Published(report))
    }

    fn archive_old(
        &mut self,
        version: &OrgStructureVersion,
        report: &mut PublishReport,
    ) -> Result<(), StepFailure> {
        let stale: usize = self
            .store
            .list_versions(version.organization_id, Some(VersionStatus::Active))?
            .iter()
            .filter(|v| needs_archive(v, version.version_id))
            .count();
        if stale == 0 {
            debug!(version_id = version.version_id, "No active version to archive");
            return Ok(());
        }

        report.archived_versions = self.store.archive_active_versions(
            version.organization_id,
            version.version_id,
            self.now.date(),
            self.now,
        )?;
        info!(
            version_id = version.version_id,
            archived = ?report.archived_versions,
            "Archived previous active version"
        );
        Ok(())
    }

    fn activate_new(&mut self, version: &OrgStructureVersion) -> Result<(), StepFailure> {
        // Re-read: an earlier attempt may already have activated it.
        let current: OrgStructureVersion = self
            .store
            .find_version(version.version_id)?
            .ok_or_else(|| StepFailure(format!("version {} vanished", version.version_id)))?;
        if !needs_activation(&current) {
            debug!(version_id = version.version_id, "Version already active");
            return Ok(());
        }
        if self.store.activate_version(version.version_id, self.now)? {
            info!(version_id = version.version_id, "Activated version");
        }
        Ok(())
    }

    fn update_identities(
        &mut self,
        version: &OrgStructureVersion,
        report: &mut PublishReport,
    ) -> Result<(), StepFailure> {
        let mut failures: Vec<String> = Vec::new();

        for reassignment in &version.reassignments {
            let number: &str = reassignment.employee_number.as_str();
            let employee: Employee = match self
                .store
                .find_employee_by_number(version.organization_id, number)
            {
                Ok(Some(employee)) => employee,
                Ok(None) => {
                    warn!(
                        version_id = version.version_id,
                        employee_number = number,
                        "Reassigned employee not found, skipping"
                    );
                    report.skipped_employees.push(number.to_string());
                    continue;
                }
                Err(e) => {
                    failures.push(format!("{number}: {e}"));
                    continue;
                }
            };

            if assignment_is_current(&employee, reassignment) {
                debug!(employee_number = number, "Assignment already current");
                continue;
            }

            match self.store.update_employee_assignment(
                employee.identity_id,
                reassignment.new_org_unit_id,
                reassignment.new_position_id,
            ) {
                Ok(true) => report.identities_updated = report.identities_updated.saturating_add(1),
                Ok(false) => debug!(employee_number = number, "Assignment write was a no-op"),
                Err(e) => {
                    warn!(employee_number = number, error = %e, "Assignment write failed");
                    failures.push(format!("{number}: {e}"));
                }
            }
        }

        aggregate(&failures, version.reassignments.len(), "identity updates")
    }

    fn create_history(
        &mut self,
        version: &OrgStructureVersion,
        report: &mut PublishReport,
    ) -> Result<(), StepFailure> {
        let mut failures: Vec<String> = Vec::new();

        for reassignment in &version.reassignments {
            let number: &str = reassignment.employee_number.as_str();
            let employee: Employee = match self
                .store
                .find_employee_by_number(version.organization_id, number)
            {
                Ok(Some(employee)) => employee,
                Ok(None) => continue,
                Err(e) => {
                    failures.push(format!("{number}: {e}"));
                    continue;
                }
            };

            match self.store.history_entry_exists(
                employee.identity_id,
                HistoryEventType::OrgRestructure,
                version.version_id,
            ) {
                Ok(true) => {
                    debug!(employee_number = number, "History entry already recorded");
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    failures.push(format!("{number}: {e}"));
                    continue;
                }
            }

            let entry: NewHistoryEntry = history_entry_for(version, &employee, reassignment);
            match self.store.insert_history_entry_if_absent(&entry, self.now) {
                Ok(true) => {
                    report.history_entries_created =
                        report.history_entries_created.saturating_add(1);
                }
                Ok(false) => debug!(employee_number = number, "History insert was a no-op"),
                Err(e) => {
                    warn!(employee_number = number, error = %e, "History insert failed");
                    failures.push(format!("{number}: {e}"));
                }
            }
        }

        aggregate(&failures, version.reassignments.len(), "history entries")
    }
}

fn history_entry_for(
    version: &OrgStructureVersion,
    employee: &Employee,
    reassignment: &Reassignment,
) -> NewHistoryEntry {
    NewHistoryEntry {
        employee_id: employee.identity_id,
        event_type: HistoryEventType::OrgRestructure,
        event_date: version.effective_date,
        previous_org_unit_id: reassignment.previous_org_unit_id,
        previous_position_id: reassignment.previous_position_id,
        new_org_unit_id: reassignment.new_org_unit_id,
        new_position_id: reassignment.new_position_id,
        details: HistoryDetails {
            version_id: version.version_id,
            version_number: version.version_number,
            sk_number: version.sk_number.clone(),
        },
    }
}

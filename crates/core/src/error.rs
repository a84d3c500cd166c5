// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use orgstruct_domain::DomainError;
use thiserror::Error;

/// Errors reported by a store implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A record addressed by identifier does not exist.
    #[error("{entity} {id} not found in store")]
    NotFound {
        /// The kind of record.
        entity: &'static str,
        /// Its identifier.
        id: String,
    },
    /// A uniqueness or conditional-write constraint rejected the write.
    #[error("Store conflict: {0}")]
    Conflict(String),
    /// The backend failed (I/O, connection, serialization).
    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Errors returned by the versioning components.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },
    #[error("Invalid state: {0}")]
    InvalidState(String),
    /// A snapshot write lost a compare-and-set race.
    #[error(
        "Version {version_id} was modified concurrently (expected structure revision {expected_revision})"
    )]
    ConcurrentModification {
        version_id: i64,
        expected_revision: i32,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl VersionError {
    pub(crate) fn version_not_found(version_id: i64) -> Self {
        Self::NotFound {
            entity: "version",
            id: version_id.to_string(),
        }
    }
}

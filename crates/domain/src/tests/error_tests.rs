// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::DomainError;

#[test]
fn test_domain_error_display() {
    let err: DomainError = DomainError::InvalidVersionStatus(String::from("pending"));
    assert_eq!(format!("{err}"), "Invalid version status: pending");

    let err: DomainError = DomainError::InvalidPublishStep(String::from("rollback"));
    assert_eq!(format!("{err}"), "Invalid publish step: rollback");

    let err: DomainError = DomainError::EmployeeNotInSnapshot {
        employee_number: String::from("E9"),
    };
    assert_eq!(
        format!("{err}"),
        "Employee 'E9' is not part of the version snapshot"
    );

    let err: DomainError = DomainError::OrgUnitNotInSnapshot(42);
    assert_eq!(format!("{err}"), "Org unit 42 is not part of the version snapshot");

    let err: DomainError = DomainError::CircularParent {
        org_unit_id: 2,
        parent_id: 5,
    };
    assert_eq!(
        format!("{err}"),
        "Setting parent of org unit 2 to 5 would create a cycle"
    );
}

#[test]
fn test_domain_error_is_std_error() {
    let err: Box<dyn std::error::Error> = Box::new(DomainError::PositionNotInSnapshot(7));
    assert_eq!(err.to_string(), "Position 7 is not part of the version snapshot");
}

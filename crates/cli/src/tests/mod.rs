// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use crate::Args;
use crate::commands::{Command, parse_date};
use clap::{CommandFactory, Parser};
use orgstruct_persistence::Persistence;
use serde_json::{Value, json};
use std::path::PathBuf;
use time::macros::date;

fn create_test_dump() -> Value {
    let employee = |id: i64, number: &str, unit: i64, position: i64| {
        json!({
            "identity_id": id,
            "organization_id": 1,
            "employee_number": number,
            "full_name": format!("Employee {number}"),
            "email": null,
            "org_unit_id": unit,
            "position_id": position,
            "manager_id": null,
            "employment_type": "permanent",
            "employment_status": "active",
            "work_location": null,
            "join_date": "2020-01-06"
        })
    };
    let unit = |id: i64, code: &str, parent: Option<i64>, level: i32| {
        json!({
            "org_unit_id": id,
            "organization_id": 1,
            "code": code,
            "name": format!("{code} unit"),
            "parent_id": parent,
            "unit_type": "department",
            "level": level,
            "sort_order": 0,
            "head_employee_id": null
        })
    };
    json!({
        "organizations": [{ "organization_id": 1, "code": "ACME", "name": "Acme" }],
        "org_units": [unit(2, "IT", Some(1), 2), unit(1, "HQ", None, 1)],
        "positions": [{
            "position_id": 10,
            "organization_id": 1,
            "code": "ENG",
            "name": "Engineer",
            "level": 3,
            "grade": "G3"
        }],
        "employees": [employee(100, "E1", 2, 10), employee(101, "E2", 1, 10)]
    })
}

fn write_test_dump(name: &str) -> PathBuf {
    let path: PathBuf = std::env::temp_dir().join(format!(
        "orgstruct_cli_{name}_{}.json",
        std::process::id()
    ));
    std::fs::write(&path, create_test_dump().to_string()).unwrap();
    path
}

fn parse(args: &[&str]) -> Command {
    let mut argv: Vec<&str> = vec!["orgstruct"];
    argv.extend_from_slice(args);
    Args::try_parse_from(argv).unwrap().command
}

fn run(persistence: &mut Persistence, args: &[&str]) -> Value {
    let mut out: Vec<u8> = Vec::new();
    parse(args).run(persistence, &mut out).unwrap();
    serde_json::from_slice(&out).unwrap()
}

fn create_test_persistence(name: &str) -> Persistence {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let dump: PathBuf = write_test_dump(name);
    let summary: Value = run(&mut persistence, &["import", dump.to_str().unwrap()]);
    std::fs::remove_file(&dump).unwrap();
    assert_eq!(summary["employees"], 2);
    persistence
}

#[test]
fn test_cli_definition_is_valid() {
    Args::command().debug_assert();
}

#[test]
fn test_parse_date() {
    assert_eq!(parse_date("2026-04-01"), Ok(date!(2026 - 04 - 01)));
    assert!(parse_date("01/04/2026").is_err());
    assert!(parse_date("2026-02-30").is_err());
}

#[test]
fn test_invalid_date_argument_is_rejected() {
    let result = Args::try_parse_from([
        "orgstruct",
        "structure-at",
        "--organization",
        "1",
        "--date",
        "yesterday",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_sync_org_unit_parent_zero_detaches() {
    let command: Command = parse(&[
        "sync-org-unit",
        "3",
        "--org-unit",
        "2",
        "--parent",
        "0",
    ]);
    let Command::SyncOrgUnit { parent, .. } = command else {
        panic!("wrong subcommand");
    };
    assert_eq!(parent, Some(0));
}

#[test]
fn test_create_propose_and_publish() {
    let mut persistence: Persistence = create_test_persistence("publish");

    let created: Value = run(
        &mut persistence,
        &[
            "create-version",
            "--organization",
            "1",
            "--name",
            "Baseline",
            "--effective-date",
            "2026-04-01",
        ],
    );
    assert_eq!(created["version_number"], 1);
    assert_eq!(created["employee_count"], 2);
    let version: String = created["version_id"].to_string();

    let proposed: Value = run(
        &mut persistence,
        &["propose", &version, "--employee", "E2", "--org-unit", "2"],
    );
    assert_eq!(proposed["employee_number"], "E2");
    assert_eq!(proposed["new_org_unit_id"], 2);

    let outcome: Value = run(&mut persistence, &["publish", &version]);
    assert_eq!(outcome["outcome"], "published");

    let again: Value = run(&mut persistence, &["publish", &version]);
    assert_eq!(again["outcome"], "already_published");

    let assignment: Value = run(
        &mut persistence,
        &["assignment-at", "--employee", "E2", "--date", "2026-05-01"],
    );
    assert_eq!(assignment["employee"]["org_unit_id"], 2);
    assert_eq!(assignment["version_number"], 1);

    let listed: Value = run(
        &mut persistence,
        &["versions", "--organization", "1", "--status", "active"],
    );
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[test]
fn test_resume_without_attempt_fails() {
    let mut persistence: Persistence = create_test_persistence("resume");
    run(
        &mut persistence,
        &[
            "create-version",
            "--organization",
            "1",
            "--name",
            "Baseline",
            "--effective-date",
            "2026-04-01",
        ],
    );

    let mut out: Vec<u8> = Vec::new();
    let result = parse(&["resume", "1"]).run(&mut persistence, &mut out);
    assert!(result.is_err());
    assert!(out.is_empty());
}

#[test]
fn test_withdraw_and_delete_draft() {
    let mut persistence: Persistence = create_test_persistence("withdraw");
    run(
        &mut persistence,
        &[
            "create",
            "--organization",
            "1",
            "--name",
            "Draft",
            "--effective-date",
            "2026-04-01",
        ],
    );

    let withdrawn: Value = run(&mut persistence, &["withdraw", "1", "--employee", "E1"]);
    assert_eq!(withdrawn["changed"], false);

    let deleted: Value = run(&mut persistence, &["delete-version", "1"]);
    assert_eq!(deleted["action"], "delete");

    let listed: Value = run(&mut persistence, &["ls", "--organization", "1"]);
    assert!(listed.as_array().unwrap().is_empty());
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn sample() -> MigrationRequest {
    MigrationRequest {
        process_id: "p1".into(),
        user_id: "u1".into(),
        container_name: "processes".into(),
        source_folder: "p1/source".into(),
        workspace_folder: "p1/workspace".into(),
        output_folder: "p1/converted".into(),
        priority: Priority::Normal,
        created_at: "2026-01-01T00:00:00Z".into(),
    }
}

#[test]
fn mandatory_fields_present_accepts_complete_request() {
    assert!(sample().mandatory_fields_present());
}

#[test]
fn mandatory_fields_present_allows_empty_user_id() {
    let mut req = sample();
    req.user_id = String::new();
    assert!(req.mandatory_fields_present());
}

#[test]
fn mandatory_fields_present_rejects_missing_process_id() {
    let mut req = sample();
    req.process_id = String::new();
    assert!(!req.mandatory_fields_present());
}

#[test]
fn mandatory_fields_present_rejects_missing_folder() {
    let mut req = sample();
    req.output_folder = String::new();
    assert!(!req.mandatory_fields_present());
}

#[test]
fn priority_defaults_to_normal() {
    assert_eq!(Priority::default(), Priority::Normal);
}

#[test]
fn priority_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"high\"");
    assert_eq!(serde_json::to_string(&Priority::Normal).unwrap(), "\"normal\"");
}

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use fireengine_cli::install::{InstallationRecord, ensure_installation, record_path};
use fireengine_cli::{load, schemas_json, summary_line};
use fireengine_schema::{Capability, Primitive};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tempfile::TempDir;

fn demo_config() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("demos")
        .join("fireengine.json")
}

// ── Demo configuration ───────────────────────────────────────────

#[test]
fn demo_configuration_resolves() {
    let resolved = load(&demo_config()).unwrap();
    let lines: Vec<String> = resolved.collections.values().map(summary_line).collect();
    assert_eq!(
        lines,
        vec![
            "articles: 4 fields, export on".to_string(),
            "users: 5 fields, export off, title \"${email}\"".to_string(),
        ]
    );
}

#[test]
fn demo_full_name_uses_catalog_renderer() {
    let resolved = load(&demo_config()).unwrap();
    let field = resolved.collection("users").unwrap().field("fullName").unwrap();
    assert_eq!(field.primitive, Primitive::String);
    assert_eq!(field.field_type.capability_source(Capability::Render), "double_input");
    assert_eq!(field.field_type.label(), "Double Input");

    let value = json!("Ada Lovelace");
    let mounted = field.field_type.mount(&field.name, &field.label, Some(&value));
    assert!(mounted.markup().contains(r#"id="fullName_first""#));

    let mut controls = HashMap::new();
    controls.insert("fullName_first".to_string(), "Grace".to_string());
    controls.insert("fullName_last".to_string(), "Hopper".to_string());
    assert_eq!(mounted.value(&controls), json!("Grace Hopper"));
}

#[test]
fn resolve_output_is_camel_case_json() {
    let resolved = load(&demo_config()).unwrap();
    let out: Value = serde_json::from_str(&schemas_json(&resolved, true).unwrap()).unwrap();
    assert_eq!(out["users"]["titleTemplate"], json!("${email}"));
    assert_eq!(out["articles"]["fields"][2]["referencePath"], json!("users"));
    assert_eq!(
        out["users"]["fields"][1]["options"][1],
        json!({"value": "user", "text": "Regular user"})
    );
}

#[test]
fn load_reports_file_and_cause() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(
        &path,
        r#"{
            "adminCredentials": {"projectId": "p", "privateKey": "k", "clientEmail": "c@p"},
            "ownerEmail": "o@example.com",
            "domain": "example.com",
            "schemaOverrides": {"posts": {"fields": [{"name": "author", "type": "reference"}]}}
        }"#,
    )
    .unwrap();

    let err = load(&path).unwrap_err();
    let chain = format!("{err:#}");
    assert!(chain.contains("broken.json"));
    assert!(chain.contains("author"));
}

#[test]
fn option_extra_keys_reach_resolved_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fireengine.json");
    fs::write(
        &path,
        r#"{
            "adminCredentials": {"projectId": "p", "privateKey": "k", "clientEmail": "c@p"},
            "ownerEmail": "o@example.com",
            "domain": "example.com",
            "schemaOverrides": {"users": {"fields": [{
                "name": "role",
                "options": [{"value": "owner", "text": "Owner", "disabled": true}, "member"]
            }]}}
        }"#,
    )
    .unwrap();

    let resolved = load(&path).unwrap();
    let out: Value = serde_json::from_str(&schemas_json(&resolved, false).unwrap()).unwrap();
    assert_eq!(
        out["users"]["fields"][0]["options"],
        json!([
            {"value": "owner", "text": "Owner", "disabled": true},
            {"value": "member", "text": "member"}
        ])
    );
}

// ── Installation record ──────────────────────────────────────────

#[test]
fn init_creates_record_once() {
    let dir = TempDir::new().unwrap();

    let (first, created) = ensure_installation(dir.path()).unwrap();
    assert!(created);
    assert!(record_path(dir.path()).exists());

    let (second, created) = ensure_installation(dir.path()).unwrap();
    assert!(!created);
    assert_eq!(first, second);
}

#[test]
fn existing_record_is_not_overwritten() {
    let dir = TempDir::new().unwrap();
    let path = record_path(dir.path());
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut planted = InstallationRecord::collect();
    planted.version = "0.0.1".into();
    fs::write(&path, serde_json::to_string(&planted).unwrap()).unwrap();

    let (record, created) = ensure_installation(dir.path()).unwrap();
    assert!(!created);
    assert_eq!(record.version, "0.0.1");
    assert_eq!(record.id, planted.id);
}

#[test]
fn record_file_has_expected_keys() {
    let dir = TempDir::new().unwrap();
    ensure_installation(dir.path()).unwrap();
    let raw: Value = serde_json::from_str(&fs::read_to_string(record_path(dir.path())).unwrap()).unwrap();
    let mut keys: Vec<&str> = raw.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["arch", "id", "platform", "timestamp", "version"]);
}

//! State document refresh: load-or-default, stamp `last_updated`, write back.

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::logging::{obj, v_str, warn, Domain};

pub const PROJECTS_KEY: &str = "projects";
pub const LAST_UPDATED_KEY: &str = "last_updated";

/// How the base document was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    Missing,
    Malformed { reason: String },
}

#[derive(Debug, Clone)]
pub struct StateUpdate {
    pub document: Map<String, Value>,
    pub outcome: LoadOutcome,
}

pub fn default_document() -> Map<String, Value> {
    let mut doc = Map::new();
    doc.insert(PROJECTS_KEY.to_string(), Value::Array(Vec::new()));
    doc
}

/// Read the state document at `path`, falling back to the default shape when
/// the file is absent or is not a JSON object. Malformed content is reported
/// with a `state_fallback` warning. Other read errors propagate.
pub fn load_or_default(path: &Path) -> Result<(Map<String, Value>, LoadOutcome)> {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Ok((default_document(), LoadOutcome::Missing));
        }
        Err(err) => {
            return Err(err).with_context(|| format!("read state file {}", path.display()));
        }
    };

    // invalid UTF-8 counts as malformed content
    let reason = match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(mut doc)) => {
            if !doc.contains_key(PROJECTS_KEY) {
                doc.insert(PROJECTS_KEY.to_string(), Value::Array(Vec::new()));
            }
            return Ok((doc, LoadOutcome::Loaded));
        }
        Ok(other) => format!("top-level value is {}, expected an object", kind_of(&other)),
        Err(err) => err.to_string(),
    };

    warn(
        Domain::State,
        "state_fallback",
        obj(&[
            ("msg", v_str("state file is not valid JSON; starting from default")),
            ("path", v_str(&path.display().to_string())),
            ("reason", v_str(&reason)),
        ]),
    );
    Ok((default_document(), LoadOutcome::Malformed { reason }))
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// ISO-8601 UTC with microseconds, e.g. `2024-01-01T09:30:00.123456Z`.
pub fn format_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Serialize with four-space indentation. Overwrites in place; not atomic.
pub fn write_document(path: &Path, doc: &Map<String, Value>) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create state dir {}", parent.display()))?;
    }
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    doc.serialize(&mut ser)?;
    buf.push(b'\n');
    fs::write(path, buf).with_context(|| format!("write state file {}", path.display()))
}

pub fn update_state(path: &Path, now: DateTime<Utc>) -> Result<StateUpdate> {
    let (mut document, outcome) = load_or_default(path)?;
    document.insert(LAST_UPDATED_KEY.to_string(), Value::String(format_timestamp(now)));
    write_document(path, &document)?;
    Ok(StateUpdate { document, outcome })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::capture;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn timestamp_is_utc_with_suffix() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        assert_eq!(format_timestamp(now), "2024-03-05T07:08:09.000000Z");
    }

    #[test]
    fn object_without_projects_gets_default_list() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, r#"{"owner": "me"}"#).unwrap();
        let (doc, outcome) = load_or_default(&path).unwrap();
        assert_eq!(outcome, LoadOutcome::Loaded);
        assert_eq!(doc["projects"], Value::Array(vec![]));
        assert_eq!(doc["owner"], "me");
    }

    #[test]
    fn non_object_json_is_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, "[1, 2, 3]").unwrap();
        let (doc, outcome) = load_or_default(&path).unwrap();
        assert!(matches!(outcome, LoadOutcome::Malformed { ref reason } if reason.contains("array")));
        assert_eq!(doc, default_document());
    }

    #[test]
    fn malformed_content_warns_with_path_and_reason() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, "{not json").unwrap();
        let (result, records) = capture(|| load_or_default(&path));
        let (_, outcome) = result.unwrap();
        let LoadOutcome::Malformed { reason } = outcome else {
            panic!("expected malformed, got {:?}", outcome);
        };
        let warnings: Vec<&Value> = records.iter().filter(|r| r["event"] == "state_fallback").collect();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0]["lvl"], "WARN");
        assert_eq!(warnings[0]["component"], "state");
        assert_eq!(warnings[0]["data"]["path"], path.display().to_string().as_str());
        assert_eq!(warnings[0]["data"]["reason"], reason.as_str());
    }

    #[test]
    fn missing_file_does_not_warn() {
        let dir = TempDir::new().unwrap();
        let (result, records) = capture(|| load_or_default(&dir.path().join("absent.json")));
        assert_eq!(result.unwrap().1, LoadOutcome::Missing);
        assert!(records.iter().all(|r| r["event"] != "state_fallback"));
    }

    #[test]
    fn directory_in_place_of_file_propagates() {
        let dir = TempDir::new().unwrap();
        assert!(load_or_default(dir.path()).is_err());
    }

    #[test]
    fn writes_four_space_indent_and_keeps_key_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/data.json");
        let mut doc = Map::new();
        doc.insert("zeta".into(), Value::from(1));
        doc.insert("alpha".into(), Value::from(2));
        write_document(&path, &doc).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "{\n    \"zeta\": 1,\n    \"alpha\": 2\n}\n");
    }
}

//! Decoding of definition text into the raw definition shape, with strict-mode
//! detection of unknown top-level keys.
//!
//! Uses `serde_ignored` while deserializing into [`RawDefinition`] to capture
//! any key the shape doesn't consume. Each unknown key is reported with its
//! file path and best-effort line number. Keys that Mbed programs commonly
//! carry but the build configuration never reads (`requires`,
//! `artifact_name`) are accepted silently. Syntax errors and well-formed JSON
//! of the wrong shape both surface as
//! [`MalformedDefinition`](BoardfigError::MalformedDefinition).

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::error::Category;

use crate::error::BoardfigError;

/// Top-level keys that are valid in definition files but carry nothing the
/// configuration uses.
const TOLERATED_KEYS: &[&str] = &["requires", "artifact_name"];

/// A definition file exactly as written, before normalization into a
/// [`Source`](crate::source::Source).
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawDefinition {
    pub name: Option<String>,
    pub config: BTreeMap<String, serde_json::Value>,
    pub macros: Vec<String>,
    pub target_overrides: BTreeMap<String, BTreeMap<String, serde_json::Value>>,
    pub labels: Option<Vec<String>>,
    pub labels_add: Vec<String>,
    pub labels_remove: Vec<String>,
    pub features: Option<Vec<String>>,
    pub features_add: Vec<String>,
    pub features_remove: Vec<String>,
    pub components: Option<Vec<String>>,
    pub components_add: Vec<String>,
    pub components_remove: Vec<String>,
}

/// Decode definition text.
///
/// With `strict`, any top-level key not part of the definition format fails
/// with [`BoardfigError::UnknownKeys`]. Without it, unknown keys are logged
/// and ignored.
pub fn decode_definition(content: &str, path: &Path, strict: bool) -> Result<RawDefinition, BoardfigError> {
    let mut unknown_keys: Vec<String> = Vec::new();

    let mut deserializer = serde_json::Deserializer::from_str(content);
    let raw: RawDefinition = serde_ignored::deserialize(&mut deserializer, |ignored_path| {
        let key = ignored_path.to_string();
        if !TOLERATED_KEYS.contains(&key.as_str()) {
            unknown_keys.push(key);
        }
    })
    .and_then(|raw| deserializer.end().map(|()| raw))
    .map_err(|e| classify(e, path))?;

    if unknown_keys.is_empty() {
        return Ok(raw);
    }

    if !strict {
        for key in &unknown_keys {
            tracing::warn!("Ignoring unknown key '{}' in {}", key, path.display());
        }
        return Ok(raw);
    }

    let errors: Vec<BoardfigError> = unknown_keys
        .into_iter()
        .map(|key| {
            let line = find_key_line(content, &key);
            BoardfigError::UnknownKey {
                key,
                path: path.to_path_buf(),
                line,
            }
        })
        .collect();

    Err(BoardfigError::UnknownKeys(errors))
}

fn classify(error: serde_json::Error, path: &Path) -> BoardfigError {
    let reason = match error.classify() {
        Category::Data => error.to_string(),
        Category::Io | Category::Syntax | Category::Eof => format!("invalid JSON: {error}"),
    };
    BoardfigError::malformed(path, reason)
}

/// Find the 1-indexed line on which a top-level JSON key is written.
///
/// Best-effort: scans for `"key"` followed by `:` and returns the first hit.
/// Returns 0 if the key cannot be located.
fn find_key_line(content: &str, key: &str) -> usize {
    let quoted = format!("\"{key}\"");
    for (i, line) in content.lines().enumerate() {
        let mut rest = line;
        while let Some(pos) = rest.find(&quoted) {
            let after = &rest[pos + quoted.len()..];
            if after.trim_start().starts_with(':') {
                return i + 1;
            }
            rest = after;
        }
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn path() -> PathBuf {
        PathBuf::from("libs/sensor/mbed_lib.json")
    }

    #[test]
    fn valid_definition_passes() {
        let content = r#"{
    "name": "sensor",
    "config": {"rate": 10},
    "macros": ["SENSOR"],
    "target_overrides": {"*": {"rate": 20}},
    "features_add": ["BLE"]
}"#;
        let raw = decode_definition(content, &path(), true).unwrap();
        assert_eq!(raw.name.as_deref(), Some("sensor"));
        assert_eq!(raw.macros, vec!["SENSOR"]);
        assert_eq!(raw.features_add, vec!["BLE"]);
        assert!(raw.target_overrides.contains_key("*"));
    }

    #[test]
    fn empty_object_is_valid() {
        let raw = decode_definition("{}", &path(), true).unwrap();
        assert!(raw.name.is_none());
        assert!(raw.config.is_empty());
    }

    #[test]
    fn strict_rejects_unknown_key_with_line() {
        let content = "{\n  \"name\": \"sensor\",\n  \"typo\": 1\n}";
        let err = decode_definition(content, &path(), true).unwrap_err();
        match err {
            BoardfigError::UnknownKeys(errors) => {
                assert_eq!(errors.len(), 1);
                match &errors[0] {
                    BoardfigError::UnknownKey { key, line, path: p } => {
                        assert_eq!(key, "typo");
                        assert_eq!(*line, 3);
                        assert_eq!(p, &path());
                    }
                    other => panic!("Expected UnknownKey, got {other:?}"),
                }
            }
            other => panic!("Expected UnknownKeys, got {other:?}"),
        }
    }

    #[test]
    fn strict_reports_every_unknown_key() {
        let content = r#"{"name": "x", "a": 1, "b": 2}"#;
        match decode_definition(content, &path(), true) {
            Err(BoardfigError::UnknownKeys(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("Expected UnknownKeys, got {other:?}"),
        }
    }

    #[test]
    fn lenient_ignores_unknown_key() {
        let content = r#"{"name": "x", "typo": ["bare-metal"]}"#;
        let raw = decode_definition(content, &path(), false).unwrap();
        assert_eq!(raw.name.as_deref(), Some("x"));
    }

    #[test]
    fn tolerated_keys_pass_strict_mode() {
        let content = r#"{"name": "x", "requires": ["bare-metal"], "artifact_name": "app"}"#;
        let raw = decode_definition(content, &path(), true).unwrap();
        assert_eq!(raw.name.as_deref(), Some("x"));
    }

    #[test]
    fn syntax_error_is_malformed() {
        let err = decode_definition("{\"name\": ", &path(), true).unwrap_err();
        match &err {
            BoardfigError::MalformedDefinition { path: p, reason } => {
                assert_eq!(p, &path());
                assert!(reason.starts_with("invalid JSON"));
            }
            other => panic!("Expected MalformedDefinition, got {other:?}"),
        }
        assert!(err.to_string().contains("mbed_lib.json"));
    }

    #[test]
    fn trailing_garbage_is_malformed() {
        let err = decode_definition("{} {}", &path(), true).unwrap_err();
        assert!(matches!(err, BoardfigError::MalformedDefinition { .. }));
    }

    #[test]
    fn wrong_type_is_malformed() {
        let err = decode_definition(r#"{"macros": "NOT_A_LIST"}"#, &path(), true).unwrap_err();
        match err {
            BoardfigError::MalformedDefinition { path: p, .. } => assert_eq!(p, path()),
            other => panic!("Expected MalformedDefinition, got {other:?}"),
        }
    }

    #[test]
    fn non_object_document_is_malformed() {
        let err = decode_definition("[1, 2]", &path(), true).unwrap_err();
        assert!(matches!(err, BoardfigError::MalformedDefinition { .. }));
    }

    #[test]
    fn find_key_line_skips_values_matching_key() {
        let content = "{\n  \"name\": \"typo\",\n  \"typo\": 1\n}";
        assert_eq!(find_key_line(content, "typo"), 3);
    }

    #[test]
    fn find_key_line_missing_returns_zero() {
        assert_eq!(find_key_line("{}", "nope"), 0);
    }
}

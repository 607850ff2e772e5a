//! Definition parser: normalize one definition into an immutable [`Source`].
//!
//! Three kinds of definition produce sources:
//!
//! - **Library files** (`mbed_lib.json`): must carry a `name`, which becomes
//!   the namespace for undotted config keys.
//! - **The application file** (`mbed_app.json`): always namespace `app`.
//! - **The target**: built from a [`TargetDefinition`], namespace `target`. It
//!   seeds the label universe with the target's name and static labels.
//!
//! A `Source` keeps every `target_overrides` block verbatim. Which blocks
//! apply is decided when the source is folded into a
//! [`Config`](crate::config::Config), against the label set active at that
//! moment.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::error::BoardfigError;
use crate::target::TargetDefinition;
use crate::types::{
    LabelKind, LabelMutations, MacroEntry, SetOp, Value, label_directive, macro_directive,
};
use crate::validate::{self, RawDefinition};

/// Pattern that matches regardless of the active labels.
pub const WILDCARD: &str = "*";

pub const APP_NAMESPACE: &str = "app";
pub const TARGET_NAMESPACE: &str = "target";

/// One declared config parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigParam {
    pub value: Option<Value>,
    pub help: Option<String>,
    /// Explicit macro name; when absent one is generated from the key.
    pub macro_name: Option<String>,
}

/// A conditional block from `target_overrides`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverrideBlock {
    /// Fully-qualified key -> new value (`None` clears the value).
    pub config: BTreeMap<String, Option<Value>>,
    pub macros_add: Vec<MacroEntry>,
    pub macros_remove: BTreeSet<String>,
    pub labels: LabelMutations,
}

/// One parsed definition. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    /// Human-readable provenance, e.g. `"File: libs/red/mbed_lib.json"`.
    pub name: String,
    pub namespace: String,
    pub path: Option<PathBuf>,
    /// Fully-qualified key -> declaration.
    pub config: BTreeMap<String, ConfigParam>,
    pub macros: Vec<MacroEntry>,
    pub labels: LabelMutations,
    /// Label pattern -> block.
    pub target_overrides: BTreeMap<String, OverrideBlock>,
}

impl Source {
    /// Parse a library definition file. A `name` is required.
    pub fn from_definition(path: &Path, content: &str, strict: bool) -> Result<Self, BoardfigError> {
        let raw = validate::decode_definition(content, path, strict)?;
        let namespace = match raw.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => return Err(BoardfigError::malformed(path, "missing library 'name'")),
        };
        Self::from_raw(raw, namespace, format!("File: {}", path.display()), path)
    }

    /// Parse the application file. Its namespace is always `app`.
    pub fn from_app(path: &Path, content: &str, strict: bool) -> Result<Self, BoardfigError> {
        let raw = validate::decode_definition(content, path, strict)?;
        Self::from_raw(
            raw,
            APP_NAMESPACE.to_string(),
            format!("File: {}", path.display()),
            path,
        )
    }

    /// Build the seed source for a hardware target.
    ///
    /// The target's own name always joins its labels so `TARGET_<name>`
    /// directories and `<name>` override patterns match.
    pub fn from_target(target: &TargetDefinition) -> Result<Self, BoardfigError> {
        let origin = PathBuf::from(format!("<target {}>", target.name));

        let mut labels = LabelMutations::default();
        let mut target_labels = vec![target.name.clone()];
        target_labels.extend(target.labels.iter().cloned());
        labels.labels.record(SetOp::Replace, target_labels);
        labels
            .features
            .record(SetOp::Replace, target.features.iter().cloned());
        labels
            .components
            .record(SetOp::Replace, target.components.iter().cloned());

        Ok(Source {
            name: format!("Target: {}", target.name),
            namespace: TARGET_NAMESPACE.to_string(),
            path: None,
            config: parse_params(&target.config, TARGET_NAMESPACE, &origin)?,
            macros: parse_macros(&target.macros, &origin)?,
            labels,
            target_overrides: BTreeMap::new(),
        })
    }

    fn from_raw(
        raw: RawDefinition,
        namespace: String,
        name: String,
        path: &Path,
    ) -> Result<Self, BoardfigError> {
        let mut labels = LabelMutations::default();
        let directives = [
            (LabelKind::Labels, raw.labels, raw.labels_add, raw.labels_remove),
            (LabelKind::Features, raw.features, raw.features_add, raw.features_remove),
            (LabelKind::Components, raw.components, raw.components_add, raw.components_remove),
        ];
        for (kind, replace, add, remove) in directives {
            let delta = labels.get_mut(kind);
            if let Some(replace) = replace {
                delta.record(SetOp::Replace, replace);
            }
            delta.record(SetOp::Add, add);
            delta.record(SetOp::Remove, remove);
        }

        let mut target_overrides = BTreeMap::new();
        for (pattern, block) in &raw.target_overrides {
            let block = parse_override_block(block, &namespace).map_err(|reason| {
                BoardfigError::malformed(path, format!("target_overrides '{pattern}': {reason}"))
            })?;
            target_overrides.insert(pattern.clone(), block);
        }

        Ok(Source {
            name,
            config: parse_params(&raw.config, &namespace, path)?,
            macros: parse_macros(&raw.macros, path)?,
            namespace,
            path: Some(path.to_path_buf()),
            labels,
            target_overrides,
        })
    }

    /// Override blocks that apply under `active_labels`: the wildcard block
    /// first, then label blocks in name order.
    pub fn active_overrides<'a>(
        &'a self,
        active_labels: &BTreeSet<String>,
    ) -> Vec<(&'a str, &'a OverrideBlock)> {
        let wildcard = self
            .target_overrides
            .get_key_value(WILDCARD)
            .map(|(k, v)| (k.as_str(), v));
        let labelled = self
            .target_overrides
            .iter()
            .filter(|(pattern, _)| pattern.as_str() != WILDCARD && active_labels.contains(*pattern))
            .map(|(k, v)| (k.as_str(), v));
        wildcard.into_iter().chain(labelled).collect()
    }
}

/// Qualify an undotted key with the namespace.
pub fn namespaced(key: &str, namespace: &str) -> String {
    if key.contains('.') {
        key.to_string()
    } else {
        format!("{namespace}.{key}")
    }
}

fn parse_params(
    config: &BTreeMap<String, serde_json::Value>,
    namespace: &str,
    path: &Path,
) -> Result<BTreeMap<String, ConfigParam>, BoardfigError> {
    config
        .iter()
        .map(|(key, raw)| {
            parse_param(raw)
                .map(|param| (namespaced(key, namespace), param))
                .map_err(|reason| BoardfigError::malformed(path, format!("config '{key}': {reason}")))
        })
        .collect()
}

/// A parameter is either a bare value or a descriptor object.
fn parse_param(raw: &serde_json::Value) -> Result<ConfigParam, String> {
    let Some(descriptor) = raw.as_object() else {
        return Ok(ConfigParam {
            value: Value::from_json(raw)?,
            help: None,
            macro_name: None,
        });
    };

    let value = match descriptor.get("value") {
        Some(v) => Value::from_json(v)?,
        None => None,
    };
    Ok(ConfigParam {
        value,
        help: optional_string(descriptor, "help")?,
        macro_name: optional_string(descriptor, "macro_name")?,
    })
}

fn optional_string(
    object: &serde_json::Map<String, serde_json::Value>,
    field: &str,
) -> Result<Option<String>, String> {
    match object.get(field) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(format!("'{field}' must be a string, found {other}")),
    }
}

fn parse_macros(raw: &[String], path: &Path) -> Result<Vec<MacroEntry>, BoardfigError> {
    raw.iter()
        .map(|m| MacroEntry::parse(m).map_err(|reason| BoardfigError::malformed(path, reason)))
        .collect()
}

fn string_list(raw: &serde_json::Value, key: &str) -> Result<Vec<String>, String> {
    match Value::from_json(raw)? {
        Some(Value::List(list)) => Ok(list),
        _ => Err(format!("'{key}' must be a list of strings")),
    }
}

fn parse_override_block(
    raw: &BTreeMap<String, serde_json::Value>,
    namespace: &str,
) -> Result<OverrideBlock, String> {
    let mut block = OverrideBlock::default();
    for (key, value) in raw {
        if let Some((kind, op)) = label_directive(key) {
            block.labels.get_mut(kind).record(op, string_list(value, key)?);
        } else if let Some(op) = macro_directive(key) {
            let names = string_list(value, key)?;
            match op {
                SetOp::Remove => block.macros_remove.extend(names),
                _ => {
                    for name in names {
                        block.macros_add.push(MacroEntry::parse(&name)?);
                    }
                }
            }
        } else {
            let value = Value::from_json(value).map_err(|reason| format!("'{key}': {reason}"))?;
            block.config.insert(namespaced(key, namespace), value);
        }
    }
    Ok(block)
}

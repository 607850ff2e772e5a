//! Shared vocabulary: config values, label sets and their mutations, macros,
//! and the framework-agnostic actions the CLI layer converts into.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

/// A single resolved config value.
///
/// Definition files are JSON, but only scalar values and lists of strings are
/// meaningful to the build. Anything else is rejected at parse time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    List(Vec<String>),
}

impl Value {
    /// Convert a JSON value. `null` maps to `Ok(None)`.
    ///
    /// Returns a human-readable reason on unsupported shapes so the caller can
    /// attach the file path.
    pub fn from_json(json: &serde_json::Value) -> Result<Option<Value>, String> {
        use serde_json::Value as Json;

        match json {
            Json::Null => Ok(None),
            Json::Bool(b) => Ok(Some(Value::Boolean(*b))),
            Json::String(s) => Ok(Some(Value::String(s.clone()))),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Ok(Some(Value::Integer(i))),
                None if n.is_u64() => Err(format!("integer {n} does not fit in 64 signed bits")),
                None => n
                    .as_f64()
                    .map(|f| Some(Value::Float(f)))
                    .ok_or_else(|| format!("number {n} is out of range")),
            },
            Json::Array(items) => items
                .iter()
                .map(|item| match item {
                    Json::String(s) => Ok(s.clone()),
                    other => Err(format!("list members must be strings, found {other}")),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(|list| Some(Value::List(list))),
            Json::Object(_) => Err("nested objects are not valid config values".into()),
        }
    }

    /// Convert into the equivalent TOML value for rendering.
    pub fn to_toml(&self) -> toml::Value {
        match self {
            Value::String(s) => toml::Value::String(s.clone()),
            Value::Integer(i) => toml::Value::Integer(*i),
            Value::Float(f) => toml::Value::Float(*f),
            Value::Boolean(b) => toml::Value::Boolean(*b),
            Value::List(l) => {
                toml::Value::Array(l.iter().cloned().map(toml::Value::String).collect())
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::List(l) => write!(f, "[{}]", l.join(", ")),
        }
    }
}

/// The three label families that scope file inclusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LabelKind {
    Labels,
    Features,
    Components,
}

impl LabelKind {
    pub const ALL: [LabelKind; 3] = [LabelKind::Labels, LabelKind::Features, LabelKind::Components];

    /// The key stem used in definition files (`labels`, `features`, `components`).
    pub fn key(self) -> &'static str {
        match self {
            LabelKind::Labels => "labels",
            LabelKind::Features => "features",
            LabelKind::Components => "components",
        }
    }

    /// The directory prefix that scopes files to this family (`TARGET_`, ...).
    pub fn dir_prefix(self) -> &'static str {
        match self {
            LabelKind::Labels => "TARGET_",
            LabelKind::Features => "FEATURE_",
            LabelKind::Components => "COMPONENT_",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        LabelKind::ALL.into_iter().find(|k| k.key() == key)
    }
}

/// How a directive mutates a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOp {
    Replace,
    Add,
    Remove,
}

/// Split a `[target.]<stem>[_add|_remove]` key into its stem and operation.
fn split_directive(key: &str) -> (&str, SetOp) {
    let key = key.strip_prefix("target.").unwrap_or(key);
    if let Some(stem) = key.strip_suffix("_add") {
        (stem, SetOp::Add)
    } else if let Some(stem) = key.strip_suffix("_remove") {
        (stem, SetOp::Remove)
    } else {
        (key, SetOp::Replace)
    }
}

/// Recognize a label directive key such as `features_add` or
/// `target.components_remove`.
pub fn label_directive(key: &str) -> Option<(LabelKind, SetOp)> {
    let (stem, op) = split_directive(key);
    LabelKind::from_key(stem).map(|kind| (kind, op))
}

/// Recognize `[target.]macros_add` / `[target.]macros_remove`.
pub fn macro_directive(key: &str) -> Option<SetOp> {
    match split_directive(key) {
        ("macros", op @ (SetOp::Add | SetOp::Remove)) => Some(op),
        _ => None,
    }
}

/// The active label universe: target labels, features, and components.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LabelSets {
    pub labels: BTreeSet<String>,
    pub features: BTreeSet<String>,
    pub components: BTreeSet<String>,
}

impl LabelSets {
    pub fn get(&self, kind: LabelKind) -> &BTreeSet<String> {
        match kind {
            LabelKind::Labels => &self.labels,
            LabelKind::Features => &self.features,
            LabelKind::Components => &self.components,
        }
    }

    pub fn get_mut(&mut self, kind: LabelKind) -> &mut BTreeSet<String> {
        match kind {
            LabelKind::Labels => &mut self.labels,
            LabelKind::Features => &mut self.features,
            LabelKind::Components => &mut self.components,
        }
    }

    pub fn contains(&self, kind: LabelKind, name: &str) -> bool {
        self.get(kind).contains(name)
    }

    /// Apply one source's (or override block's) mutations.
    pub fn apply(&mut self, mutations: &LabelMutations) {
        for kind in LabelKind::ALL {
            mutations.get(kind).apply_to(self.get_mut(kind));
        }
    }
}

/// Mutations a definition makes to one label family.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelDelta {
    /// Bare `X` key: replaces the whole set.
    pub replace: Option<BTreeSet<String>>,
    pub add: BTreeSet<String>,
    pub remove: BTreeSet<String>,
}

impl LabelDelta {
    /// Record a directive. Repeated directives of the same op accumulate.
    pub fn record(&mut self, op: SetOp, names: impl IntoIterator<Item = String>) {
        match op {
            SetOp::Replace => self.replace.get_or_insert_with(BTreeSet::new).extend(names),
            SetOp::Add => self.add.extend(names),
            SetOp::Remove => self.remove.extend(names),
        }
    }

    /// Replace, then add, then remove.
    pub fn apply_to(&self, set: &mut BTreeSet<String>) {
        if let Some(replacement) = &self.replace {
            set.clone_from(replacement);
        }
        set.extend(self.add.iter().cloned());
        for name in &self.remove {
            set.remove(name);
        }
    }
}

/// Label, feature, and component mutations of one definition block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelMutations {
    pub labels: LabelDelta,
    pub features: LabelDelta,
    pub components: LabelDelta,
}

impl LabelMutations {
    pub fn get(&self, kind: LabelKind) -> &LabelDelta {
        match kind {
            LabelKind::Labels => &self.labels,
            LabelKind::Features => &self.features,
            LabelKind::Components => &self.components,
        }
    }

    pub fn get_mut(&mut self, kind: LabelKind) -> &mut LabelDelta {
        match kind {
            LabelKind::Labels => &mut self.labels,
            LabelKind::Features => &mut self.features,
            LabelKind::Components => &mut self.components,
        }
    }
}

/// A preprocessor macro as written in a definition: `NAME` or `NAME=VALUE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroEntry {
    pub name: String,
    pub value: Option<String>,
}

impl MacroEntry {
    /// Parse `NAME` or `NAME=VALUE`. Only the first `=` splits.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let (name, value) = match raw.split_once('=') {
            Some((name, value)) => (name.trim(), Some(value.to_string())),
            None => (raw.trim(), None),
        };
        if name.is_empty() {
            return Err(format!("macro '{raw}' has an empty name"));
        }
        Ok(MacroEntry {
            name: name.to_string(),
            value,
        })
    }
}

/// Output format for listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Toml,
}

/// A consumer operation on an assembled config, independent of any CLI
/// framework. The CLI layer converts parsed clap args into this.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigAction {
    /// Show every resolved option and macro.
    List { format: OutputFormat },
    /// Show one option by fully-qualified key (e.g. `"app.baud-rate"`).
    Get { key: String },
    /// Show the resolved label, feature, and component sets.
    Labels,
}

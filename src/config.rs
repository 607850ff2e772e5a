//! The config accumulator: cumulative, order-dependent merge state.
//!
//! [`Config::fold`] applies one [`Source`] in four steps:
//!
//! 1. The source's own config declarations (last writer wins).
//! 2. The source's own macros (same name overwrites).
//! 3. The source's label, feature, and component mutations.
//! 4. Each override block whose pattern is `"*"` or an active label, in
//!    that order, with the same rules. Override blocks always win over the
//!    base block of the same source.
//!
//! Every fold is a pure function of the prior state and the source, so the
//! final config depends only on the order of sources.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::source::{ConfigParam, OverrideBlock, Source};
use crate::types::{LabelSets, MacroEntry, Value};

/// Default prefix for generated option macro names.
pub const DEFAULT_MACRO_PREFIX: &str = "MBED_CONF";

/// A resolved config option.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigOption {
    pub key: String,
    pub value: Option<Value>,
    pub macro_name: String,
    pub help_text: Option<String>,
    /// Provenance of the current value.
    pub set_by: String,
}

/// A resolved preprocessor macro.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Macro {
    pub name: String,
    pub value: Option<String>,
    pub set_by: String,
}

impl Macro {
    /// The `NAME` or `NAME=VALUE` form used on compiler command lines.
    pub fn definition(&self) -> String {
        match &self.value {
            Some(value) => format!("{}={}", self.name, value),
            None => self.name.clone(),
        }
    }
}

/// Cumulative merge result for one target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    /// Fully-qualified key -> option, ordered by key.
    pub options: BTreeMap<String, ConfigOption>,
    /// Macro name -> macro, ordered by name.
    pub macros: BTreeMap<String, Macro>,
    #[serde(flatten)]
    pub active: LabelSets,
    #[serde(skip)]
    macro_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self::with_macro_prefix(DEFAULT_MACRO_PREFIX)
    }

    /// An empty config whose generated macro names start with `prefix`.
    pub fn with_macro_prefix(prefix: &str) -> Self {
        Config {
            options: BTreeMap::new(),
            macros: BTreeMap::new(),
            active: LabelSets::default(),
            macro_prefix: prefix.to_string(),
        }
    }

    /// Fold an ordered sequence of sources into a fresh config.
    pub fn from_sources<'a>(sources: impl IntoIterator<Item = &'a Source>) -> Self {
        let mut config = Self::new();
        for source in sources {
            config.fold(source);
        }
        config
    }

    /// The currently active labels, features, and components.
    pub fn active(&self) -> &LabelSets {
        &self.active
    }

    pub fn option(&self, key: &str) -> Option<&ConfigOption> {
        self.options.get(key)
    }

    /// The value of an option, if declared and set.
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.options.get(key).and_then(|o| o.value.as_ref())
    }

    /// Apply one source.
    pub fn fold(&mut self, source: &Source) {
        tracing::debug!("Folding {}", source.name);

        for (key, param) in &source.config {
            self.declare(key, param, &source.name);
        }
        for entry in &source.macros {
            self.set_macro(entry, &source.name);
        }
        self.active.apply(&source.labels);

        let blocks = source.active_overrides(&self.active.labels);
        for (pattern, block) in blocks {
            let origin = format!("{} [{}]", source.name, pattern);
            self.apply_override(block, &origin);
        }
    }

    fn declare(&mut self, key: &str, param: &ConfigParam, origin: &str) {
        let macro_name = param
            .macro_name
            .clone()
            .unwrap_or_else(|| self.generated_macro_name(key));
        self.options.insert(
            key.to_string(),
            ConfigOption {
                key: key.to_string(),
                value: param.value.clone(),
                macro_name,
                help_text: param.help.clone(),
                set_by: origin.to_string(),
            },
        );
    }

    fn apply_override(&mut self, block: &OverrideBlock, origin: &str) {
        for (key, value) in &block.config {
            match self.options.get_mut(key) {
                Some(option) => {
                    option.value = value.clone();
                    option.set_by = origin.to_string();
                }
                None => {
                    tracing::warn!("{origin} overrides undeclared option '{key}'");
                    let param = ConfigParam {
                        value: value.clone(),
                        help: None,
                        macro_name: None,
                    };
                    self.declare(key, &param, origin);
                }
            }
        }
        for entry in &block.macros_add {
            self.set_macro(entry, origin);
        }
        for name in &block.macros_remove {
            self.macros.remove(name);
        }
        self.active.apply(&block.labels);
    }

    fn set_macro(&mut self, entry: &MacroEntry, origin: &str) {
        self.macros.insert(
            entry.name.clone(),
            Macro {
                name: entry.name.clone(),
                value: entry.value.clone(),
                set_by: origin.to_string(),
            },
        );
    }

    /// `red.bool` -> `MBED_CONF_RED_BOOL`.
    fn generated_macro_name(&self, key: &str) -> String {
        let suffix: String = key
            .chars()
            .map(|c| match c {
                '.' | '-' => '_',
                c => c.to_ascii_uppercase(),
            })
            .collect();
        format!("{}_{}", self.macro_prefix, suffix)
    }
}

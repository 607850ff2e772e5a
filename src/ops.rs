//! Consumer operations on an assembled [`Config`]: listing, key lookup, label
//! sets, and the [`ConfigResult`] enum callers use to display results.

use std::fmt;

use crate::config::Config;
use crate::error::BoardfigError;
use crate::types::{LabelSets, OutputFormat, Value};

/// Result of a config operation. Returned to the caller for display.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigResult {
    /// A rendered listing (text, JSON, or TOML).
    Rendered(String),
    /// One option's resolved value and metadata.
    KeyValue {
        key: String,
        value: String,
        macro_name: String,
        help: Option<String>,
        set_by: String,
    },
    /// The resolved label sets.
    Labels(LabelSets),
}

impl fmt::Display for ConfigResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigResult::Rendered(text) => write!(f, "{text}"),
            ConfigResult::KeyValue {
                key,
                value,
                macro_name,
                help,
                set_by,
            } => {
                if let Some(help) = help {
                    writeln!(f, "# {help}")?;
                }
                writeln!(f, "# macro: {macro_name}")?;
                writeln!(f, "# set by: {set_by}")?;
                write!(f, "{key} = {value}")
            }
            ConfigResult::Labels(sets) => {
                writeln!(f, "labels = {}", join(&sets.labels))?;
                writeln!(f, "features = {}", join(&sets.features))?;
                write!(f, "components = {}", join(&sets.components))
            }
        }
    }
}

fn join<'a>(names: impl IntoIterator<Item = &'a String>) -> String {
    names
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render every option and macro in the requested format.
pub fn list_values(config: &Config, format: OutputFormat) -> Result<ConfigResult, BoardfigError> {
    let rendered = match format {
        OutputFormat::Text => render_text(config),
        OutputFormat::Json => {
            serde_json::to_string_pretty(config).map_err(|e| BoardfigError::InvalidValue {
                key: "<list>".into(),
                reason: e.to_string(),
            })?
        }
        OutputFormat::Toml => {
            toml::to_string(&to_toml_table(config)).map_err(|e| BoardfigError::InvalidValue {
                key: "<list>".into(),
                reason: e.to_string(),
            })?
        }
    };
    Ok(ConfigResult::Rendered(rendered))
}

/// Look up one option by fully-qualified key.
pub fn get_value(config: &Config, key: &str) -> Result<ConfigResult, BoardfigError> {
    let option = config
        .option(key)
        .ok_or_else(|| BoardfigError::KeyNotFound(key.into()))?;

    Ok(ConfigResult::KeyValue {
        key: key.into(),
        value: format_value(option.value.as_ref()),
        macro_name: option.macro_name.clone(),
        help: option.help_text.clone(),
        set_by: option.set_by.clone(),
    })
}

pub fn labels(config: &Config) -> ConfigResult {
    ConfigResult::Labels(config.active().clone())
}

fn format_value(value: Option<&Value>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "<not set>".to_string(),
    }
}

/// Aligned `NAME = value  # set by` lines: options sorted by macro name, then
/// macros sorted by name. The name column is as wide as the longest name.
pub fn render_text(config: &Config) -> String {
    let mut options: Vec<_> = config.options.values().collect();
    options.sort_by(|a, b| a.macro_name.cmp(&b.macro_name));

    let mut rows: Vec<(String, String, &str)> = options
        .into_iter()
        .map(|o| (o.macro_name.clone(), format_value(o.value.as_ref()), o.set_by.as_str()))
        .collect();
    rows.extend(config.macros.values().map(|m| {
        (
            m.name.clone(),
            m.value.clone().unwrap_or_default(),
            m.set_by.as_str(),
        )
    }));

    let name_width = rows.iter().map(|(n, _, _)| n.len()).max().unwrap_or(0);
    let value_width = rows.iter().map(|(_, v, _)| v.len()).max().unwrap_or(0);

    rows.iter()
        .map(|(name, value, set_by)| {
            format!("{name:<name_width$} = {value:<value_width$}  # {set_by}")
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Project the config onto TOML: `[options]` keyed by option key (unset
/// options omitted), `[macros]` keyed by name, and a `[labels]` table.
pub fn to_toml_table(config: &Config) -> toml::Table {
    let options: toml::Table = config
        .options
        .iter()
        .filter_map(|(key, option)| option.value.as_ref().map(|v| (key.clone(), v.to_toml())))
        .collect();

    let macros: toml::Table = config
        .macros
        .iter()
        .map(|(name, m)| {
            let value = match &m.value {
                Some(v) => toml::Value::String(v.clone()),
                None => toml::Value::Boolean(true),
            };
            (name.clone(), value)
        })
        .collect();

    let set = |names: &std::collections::BTreeSet<String>| {
        toml::Value::Array(names.iter().cloned().map(toml::Value::String).collect())
    };
    let mut labels = toml::Table::new();
    labels.insert("labels".into(), set(&config.active().labels));
    labels.insert("features".into(), set(&config.active().features));
    labels.insert("components".into(), set(&config.active().components));

    let mut table = toml::Table::new();
    table.insert("options".into(), toml::Value::Table(options));
    table.insert("macros".into(), toml::Value::Table(macros));
    table.insert("labels".into(), toml::Value::Table(labels));
    table
}

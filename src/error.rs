use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
#[cfg_attr(feature = "rich-errors", derive(miette::Diagnostic))]
pub enum BoardfigError {
    #[error("Malformed definition {path}: {reason}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(boardfig::malformed_definition)))]
    MalformedDefinition { path: PathBuf, reason: String },

    /// The target database is not valid JSON. Definition files report
    /// syntax errors as `MalformedDefinition`.
    #[error("Failed to parse {path}: {source}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(boardfig::parse)))]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Unknown key '{key}' in {path} (line {line})")]
    #[cfg_attr(
        feature = "rich-errors",
        diagnostic(
            code(boardfig::unknown_key),
            help("disable strict mode to ignore unrecognized keys")
        )
    )]
    UnknownKey {
        key: String,
        path: PathBuf,
        line: usize,
    },

    #[error("Unknown keys in definition file: {}", join_keys(.0))]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(boardfig::unknown_keys)))]
    UnknownKeys(Vec<BoardfigError>),

    #[error("Failed to read {path}: {source}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(boardfig::io)))]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Unknown target '{0}'")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(boardfig::unknown_target)))]
    UnknownTarget(String),

    #[error("Settings error: {0}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(boardfig::settings)))]
    SettingsError(#[from] confique::Error),

    #[error("Key not found: {0}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(boardfig::key_not_found)))]
    KeyNotFound(String),

    #[error("Invalid value for '{key}': {reason}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(boardfig::invalid_value)))]
    InvalidValue { key: String, reason: String },

    #[error("Target is required (call .target() on the builder)")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(boardfig::target_required)))]
    TargetRequired,

    #[error("Program root is required (call .program_root() on the builder)")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(boardfig::program_root_required)))]
    ProgramRootRequired,

    #[error("No target database (call .targets() or .targets_file() on the builder)")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(boardfig::targets_required)))]
    TargetsRequired,
}

fn join_keys(errors: &[BoardfigError]) -> String {
    errors
        .iter()
        .map(|e| match e {
            BoardfigError::UnknownKey { key, line, .. } => format!("'{key}' (line {line})"),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

impl BoardfigError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        BoardfigError::MalformedDefinition {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

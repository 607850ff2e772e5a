//! Engine settings: file names, macro prefix, strictness, and discovery
//! exclusions.
//!
//! Loaded through confique, so every field has a compiled default and can be
//! overridden by a TOML file or an environment variable:
//!
//! ```text
//! Compiled defaults      #[config(default = ...)]
//!        ↑ overridden by
//! Platform config file   e.g. ~/.config/boardfig/boardfig.toml
//!        ↑ overridden by
//! Explicit file          --settings path/to/boardfig.toml
//!        ↑ overridden by
//! Environment vars       BOARDFIG_*
//! ```

use std::path::{Path, PathBuf};

use confique::Config;

use crate::error::BoardfigError;

pub const SETTINGS_FILE_NAME: &str = "boardfig.toml";

#[derive(Config, Debug, Clone, PartialEq)]
pub struct Settings {
    /// File name of library definition files searched for under the program root.
    #[config(default = "mbed_lib.json", env = "BOARDFIG_DEFINITION_FILE")]
    pub definition_file_name: String,

    /// File name of the application override file at the program root.
    #[config(default = "mbed_app.json", env = "BOARDFIG_APP_FILE")]
    pub app_file_name: String,

    /// Prefix of generated option macro names.
    #[config(default = "MBED_CONF", env = "BOARDFIG_MACRO_PREFIX")]
    pub macro_prefix: String,

    /// Reject unknown top-level keys in definition files.
    #[config(default = false, env = "BOARDFIG_STRICT")]
    pub strict: bool,

    /// Directory names skipped during discovery.
    #[config(default = [".git", "BUILD", "cmake_build"])]
    pub ignore_dirs: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            definition_file_name: "mbed_lib.json".into(),
            app_file_name: "mbed_app.json".into(),
            macro_prefix: crate::config::DEFAULT_MACRO_PREFIX.into(),
            strict: false,
            ignore_dirs: vec![".git".into(), "BUILD".into(), "cmake_build".into()],
        }
    }
}

impl Settings {
    /// Load settings from env vars, an optional explicit file, and the
    /// platform config directory. Missing files are skipped.
    pub fn load(explicit: Option<&Path>) -> Result<Self, BoardfigError> {
        Self::load_from(explicit, platform_settings_path().as_deref())
    }

    /// Like [`load`](Self::load) but with an explicit platform file location.
    pub fn load_from(explicit: Option<&Path>, platform: Option<&Path>) -> Result<Self, BoardfigError> {
        let mut builder = Settings::builder().env();
        if let Some(path) = explicit {
            builder = builder.file(path);
        }
        if let Some(path) = platform {
            builder = builder.file(path);
        }
        Ok(builder.load()?)
    }
}

/// `boardfig.toml` in the OS config directory, if one can be determined.
pub fn platform_settings_path() -> Option<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "boardfig")?;
    Some(dirs.config_dir().join(SETTINGS_FILE_NAME))
}

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::BoardfigError;
use crate::file;
use crate::ops::{self, ConfigResult};
use crate::resolve::{self, ResolveInput};
use crate::settings::Settings;
use crate::source::Source;
use crate::target::TargetDatabase;
use crate::types::ConfigAction;

/// Entry point for assembling a target build configuration.
pub struct Boardfig;

impl Boardfig {
    pub fn builder() -> BoardfigBuilder {
        BoardfigBuilder::new()
    }
}

/// Builder that gathers the inputs of one assembly: the target, where its
/// definition comes from, and the program tree to scan.
///
/// Engine settings (file names, macro prefix, strictness) come from a
/// [`Settings`] value; individual setters override single fields of it.
pub struct BoardfigBuilder {
    target: Option<String>,
    targets: Option<TargetDatabase>,
    targets_file: Option<PathBuf>,
    program_root: Option<PathBuf>,
    app_file: Option<PathBuf>,
    settings: Settings,
    strict: Option<bool>,
    macro_prefix: Option<String>,
    definition_file_name: Option<String>,
    app_file_name: Option<String>,
}

impl BoardfigBuilder {
    fn new() -> Self {
        Self {
            target: None,
            targets: None,
            targets_file: None,
            program_root: None,
            app_file: None,
            settings: Settings::default(),
            strict: None,
            macro_prefix: None,
            definition_file_name: None,
            app_file_name: None,
        }
    }

    /// Name of the target to assemble for (e.g. `"K64F"`).
    pub fn target(mut self, name: &str) -> Self {
        self.target = Some(name.to_string());
        self
    }

    /// Use an in-memory target database.
    pub fn targets(mut self, db: TargetDatabase) -> Self {
        self.targets = Some(db);
        self
    }

    /// Read the target database from a JSON file. Ignored when
    /// [`targets`](Self::targets) is also set.
    pub fn targets_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.targets_file = Some(path.into());
        self
    }

    /// Root of the program tree scanned for library definition files.
    pub fn program_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.program_root = Some(path.into());
        self
    }

    /// Use this application file instead of `{program_root}/{app_file_name}`.
    /// Unlike the default location, an explicit file must exist.
    pub fn app_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.app_file = Some(path.into());
        self
    }

    /// Replace the engine settings wholesale (default: [`Settings::default`]).
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Enable or disable strict mode (default: off).
    /// In strict mode, unknown top-level keys in definition files are errors.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = Some(strict);
        self
    }

    /// Override the prefix of generated option macro names.
    pub fn macro_prefix(mut self, prefix: &str) -> Self {
        self.macro_prefix = Some(prefix.to_string());
        self
    }

    /// Override the library definition file name (default: `"mbed_lib.json"`).
    pub fn definition_file_name(mut self, name: &str) -> Self {
        self.definition_file_name = Some(name.to_string());
        self
    }

    /// Override the application file name (default: `"mbed_app.json"`).
    pub fn app_file_name(mut self, name: &str) -> Self {
        self.app_file_name = Some(name.to_string());
        self
    }

    fn effective_target(&self) -> Result<&str, BoardfigError> {
        self.target.as_deref().ok_or(BoardfigError::TargetRequired)
    }

    fn effective_program_root(&self) -> Result<&Path, BoardfigError> {
        self.program_root
            .as_deref()
            .ok_or(BoardfigError::ProgramRootRequired)
    }

    fn effective_strict(&self) -> bool {
        self.strict.unwrap_or(self.settings.strict)
    }

    fn effective_macro_prefix(&self) -> &str {
        self.macro_prefix
            .as_deref()
            .unwrap_or(&self.settings.macro_prefix)
    }

    fn effective_definition_file_name(&self) -> &str {
        self.definition_file_name
            .as_deref()
            .unwrap_or(&self.settings.definition_file_name)
    }

    fn effective_app_file(&self) -> Result<PathBuf, BoardfigError> {
        if let Some(path) = &self.app_file {
            return Ok(path.clone());
        }
        let name = self
            .app_file_name
            .as_deref()
            .unwrap_or(&self.settings.app_file_name);
        Ok(self.effective_program_root()?.join(name))
    }

    /// Look up the target and turn it into the seed source.
    fn target_source(&self) -> Result<Source, BoardfigError> {
        let name = self.effective_target()?;
        let loaded;
        let db = match (&self.targets, &self.targets_file) {
            (Some(db), _) => db,
            (None, Some(path)) => {
                loaded = TargetDatabase::load(path)?;
                &loaded
            }
            (None, None) => return Err(BoardfigError::TargetsRequired),
        };
        Source::from_target(db.get(name)?)
    }

    /// Build the `ResolveInput` from current builder state.
    fn build_input(&self) -> Result<ResolveInput, BoardfigError> {
        // An unknown target fails before any file is scanned.
        let target = self.target_source()?;
        let root = self.effective_program_root()?;

        let paths = file::find_definition_files(
            root,
            self.effective_definition_file_name(),
            &self.settings.ignore_dirs,
        )?;
        let files = file::load_files(paths)?;

        let app_file = match &self.app_file {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| BoardfigError::IoError {
                    path: path.clone(),
                    source: e,
                })?;
                Some((path.clone(), content))
            }
            None => file::load_optional(&self.effective_app_file()?)?,
        };

        Ok(ResolveInput {
            target,
            files,
            app_file,
            program_root: Some(root.to_path_buf()),
            strict: self.effective_strict(),
            macro_prefix: self.effective_macro_prefix().to_string(),
        })
    }

    /// Scan the program tree and assemble the target's configuration.
    pub fn assemble(self) -> Result<Config, BoardfigError> {
        let input = self.build_input()?;
        tracing::debug!(
            "Assembling for target '{}' from {} candidate file(s)",
            self.target.as_deref().unwrap_or_default(),
            input.files.len()
        );
        resolve::resolve(input)
    }

    /// Handle a `ConfigAction` and print the result to stdout.
    pub fn handle_and_print(self, action: &ConfigAction) -> Result<(), BoardfigError> {
        let result = self.handle(action)?;
        println!("{result}");
        Ok(())
    }

    /// Handle a `ConfigAction` (list / get / labels).
    pub fn handle(self, action: &ConfigAction) -> Result<ConfigResult, BoardfigError> {
        let config = self.assemble()?;
        match action {
            ConfigAction::List { format } => ops::list_values(&config, *format),
            ConfigAction::Get { key } => ops::get_value(&config, key),
            ConfigAction::Labels => Ok(ops::labels(&config)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{CASCADE_APP, cascade_files, cascade_target, k64f};
    use crate::types::{OutputFormat, Value};
    use std::fs;
    use tempfile::TempDir;

    fn db() -> TargetDatabase {
        let mut db = TargetDatabase::new();
        db.insert(cascade_target());
        db.insert(k64f());
        db
    }

    /// Write the cascading scenario onto disk and return its root.
    fn cascade_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        for (rel, content) in cascade_files() {
            let path = dir.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        fs::write(dir.path().join("mbed_app.json"), CASCADE_APP).unwrap();
        dir
    }

    fn builder(dir: &TempDir) -> BoardfigBuilder {
        Boardfig::builder()
            .target("A")
            .targets(db())
            .program_root(dir.path())
    }

    #[test]
    fn settings_supply_defaults() {
        let b = Boardfig::builder();
        assert!(!b.effective_strict());
        assert_eq!(b.effective_macro_prefix(), "MBED_CONF");
        assert_eq!(b.effective_definition_file_name(), "mbed_lib.json");
    }

    #[test]
    fn setters_override_settings() {
        let settings = Settings {
            macro_prefix: "FROM_SETTINGS".into(),
            strict: true,
            ..Settings::default()
        };
        let b = Boardfig::builder()
            .settings(settings)
            .macro_prefix("FROM_SETTER")
            .definition_file_name("lib.json");
        assert!(b.effective_strict());
        assert_eq!(b.effective_macro_prefix(), "FROM_SETTER");
        assert_eq!(b.effective_definition_file_name(), "lib.json");
    }

    #[test]
    fn app_file_defaults_under_program_root() {
        let b = Boardfig::builder().program_root("/prog");
        assert_eq!(b.effective_app_file().unwrap(), PathBuf::from("/prog/mbed_app.json"));

        let b = Boardfig::builder()
            .program_root("/prog")
            .app_file_name("app.json");
        assert_eq!(b.effective_app_file().unwrap(), PathBuf::from("/prog/app.json"));
    }

    #[test]
    fn missing_target_is_error() {
        let dir = TempDir::new().unwrap();
        let result = Boardfig::builder()
            .targets(db())
            .program_root(dir.path())
            .assemble();
        assert!(matches!(result, Err(BoardfigError::TargetRequired)));
    }

    #[test]
    fn missing_program_root_is_error() {
        let result = Boardfig::builder().target("A").targets(db()).assemble();
        assert!(matches!(result, Err(BoardfigError::ProgramRootRequired)));
    }

    #[test]
    fn missing_database_is_error() {
        let dir = TempDir::new().unwrap();
        let result = Boardfig::builder()
            .target("A")
            .program_root(dir.path())
            .assemble();
        assert!(matches!(result, Err(BoardfigError::TargetsRequired)));
    }

    #[test]
    fn unknown_target_fails_before_scanning() {
        // The root does not exist, so scanning would be an IoError.
        let dir = TempDir::new().unwrap();
        let result = Boardfig::builder()
            .target("NOPE")
            .targets(db())
            .program_root(dir.path().join("missing"))
            .assemble();
        match result {
            Err(BoardfigError::UnknownTarget(name)) => assert_eq!(name, "NOPE"),
            other => panic!("Expected UnknownTarget, got {other:?}"),
        }
    }

    #[test]
    fn assemble_cascade_from_disk() {
        let dir = cascade_tree();
        let config = builder(&dir).assemble().unwrap();

        assert_eq!(config.value("red.bool"), Some(&Value::Boolean(true)));
        assert_eq!(config.value("leg.number-of-fingers"), Some(&Value::Integer(5)));
        assert_eq!(config.value("target.foo"), Some(&Value::String("bar".into())));
        assert!(config.macros.contains_key("LEG_MACRO"));
        assert!(!config.macros.contains_key("DONT_USE_THIS_MACRO"));
        assert!(config.active().components.contains("LEG"));
    }

    #[test]
    fn program_root_above_scoped_dir_does_not_scope() {
        let outer = TempDir::new().unwrap();
        let root = outer.path().join("TARGET_B").join("program");
        fs::create_dir_all(&root).unwrap();
        fs::write(
            root.join("mbed_lib.json"),
            r#"{"name": "l", "macros": ["SEEN"]}"#,
        )
        .unwrap();

        let config = Boardfig::builder()
            .target("A")
            .targets(db())
            .program_root(&root)
            .assemble()
            .unwrap();
        assert!(config.macros.contains_key("SEEN"));
    }

    #[test]
    fn targets_file_is_loaded() {
        let dir = cascade_tree();
        let targets = dir.path().join("targets.json");
        fs::write(&targets, r#"{"A": {"config": {"foo": "foo"}}}"#).unwrap();

        let config = Boardfig::builder()
            .target("A")
            .targets_file(&targets)
            .program_root(dir.path())
            .assemble()
            .unwrap();
        assert_eq!(config.value("target.foo"), Some(&Value::String("bar".into())));
    }

    #[test]
    fn explicit_app_file_replaces_default() {
        let dir = cascade_tree();
        let app = dir.path().join("other_app.json");
        fs::write(&app, r#"{"target_overrides": {"A": {"target.foo": "other"}}}"#).unwrap();

        let config = builder(&dir).app_file(&app).assemble().unwrap();
        assert_eq!(config.value("target.foo"), Some(&Value::String("other".into())));
    }

    #[test]
    fn explicit_missing_app_file_is_io_error() {
        let dir = cascade_tree();
        let result = builder(&dir).app_file(dir.path().join("gone.json")).assemble();
        assert!(matches!(result, Err(BoardfigError::IoError { .. })));
    }

    #[test]
    fn no_app_file_is_fine() {
        let dir = cascade_tree();
        fs::remove_file(dir.path().join("mbed_app.json")).unwrap();
        let config = builder(&dir).assemble().unwrap();
        assert_eq!(config.value("target.foo"), Some(&Value::String("foo".into())));
    }

    #[test]
    fn strict_mode_rejects_unknown_keys() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("mbed_lib.json"),
            "{\n  \"name\": \"l\",\n  \"confg\": {}\n}",
        )
        .unwrap();

        let result = builder(&dir).strict(true).assemble();
        match result {
            Err(BoardfigError::UnknownKeys(errors)) => {
                assert_eq!(errors.len(), 1);
                assert!(matches!(
                    &errors[0],
                    BoardfigError::UnknownKey { key, line: 3, .. } if key == "confg"
                ));
            }
            other => panic!("Expected UnknownKeys, got {other:?}"),
        }

        assert!(builder(&dir).assemble().is_ok());
    }

    #[test]
    fn custom_definition_file_name() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("board_lib.json"),
            r#"{"name": "l", "config": {"x": 1}}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("mbed_lib.json"),
            r#"{"name": "ignored", "config": {"y": 1}}"#,
        )
        .unwrap();

        let config = builder(&dir)
            .definition_file_name("board_lib.json")
            .assemble()
            .unwrap();
        assert!(config.option("l.x").is_some());
        assert!(config.option("ignored.y").is_none());
    }

    #[test]
    fn ignored_dirs_are_not_scanned() {
        let dir = TempDir::new().unwrap();
        let build = dir.path().join("BUILD");
        fs::create_dir_all(&build).unwrap();
        fs::write(build.join("mbed_lib.json"), "not json").unwrap();

        assert!(builder(&dir).assemble().is_ok());
    }

    #[test]
    fn handle_get() {
        let dir = cascade_tree();
        let result = builder(&dir)
            .handle(&ConfigAction::Get {
                key: "a.number".into(),
            })
            .unwrap();
        match result {
            ConfigResult::KeyValue {
                value, macro_name, ..
            } => {
                assert_eq!(value, "123");
                assert_eq!(macro_name, "MBED_CONF_A_NUMBER");
            }
            other => panic!("Expected KeyValue, got {other:?}"),
        }
    }

    #[test]
    fn handle_get_unknown_key() {
        let dir = cascade_tree();
        let result = builder(&dir).handle(&ConfigAction::Get {
            key: "nope.nope".into(),
        });
        assert!(matches!(result, Err(BoardfigError::KeyNotFound(_))));
    }

    #[test]
    fn handle_list_text() {
        let dir = cascade_tree();
        let result = builder(&dir)
            .handle(&ConfigAction::List {
                format: OutputFormat::Text,
            })
            .unwrap();
        let text = result.to_string();
        assert!(text.contains("MBED_CONF_RED_BOOL"));
        assert!(text.contains("LEG_MACRO"));
        assert!(!text.contains("DONT_USE_THIS_MACRO"));
    }

    #[test]
    fn handle_labels() {
        let dir = cascade_tree();
        let result = builder(&dir).handle(&ConfigAction::Labels).unwrap();
        match result {
            ConfigResult::Labels(sets) => {
                assert!(sets.labels.contains("A"));
                assert!(sets.features.contains("BLUE"));
            }
            other => panic!("Expected Labels, got {other:?}"),
        }
    }
}

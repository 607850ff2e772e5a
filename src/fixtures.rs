#[cfg(test)]
pub mod test {
    use std::path::{Path, PathBuf};

    use crate::resolve::ResolveInput;
    use crate::source::Source;
    use crate::target::TargetDefinition;

    /// A bare target with the given extra labels.
    pub fn target(name: &str, labels: &[&str]) -> TargetDefinition {
        TargetDefinition {
            name: name.to_string(),
            labels: labels.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    /// A realistic target with labels, features, macros, and config.
    pub fn k64f() -> TargetDefinition {
        TargetDefinition {
            name: "K64F".into(),
            labels: vec!["FRDM".into(), "Freescale".into()],
            features: vec!["PSA".into()],
            components: vec!["SD".into()],
            macros: vec!["CPU_MK64FN1M0VMD12".into()],
            config: [("stdio-baud".to_string(), serde_json::json!(9600))]
                .into_iter()
                .collect(),
        }
    }

    pub fn target_source(target: &TargetDefinition) -> Source {
        Source::from_target(target).unwrap()
    }

    /// Parse a library definition strictly, panicking on error.
    pub fn lib_source(path: &str, content: &str) -> Source {
        Source::from_definition(Path::new(path), content, true).unwrap()
    }

    /// Library files for the cascading scenario, relative to the program root.
    ///
    /// - `TARGET_A/` adds feature `RED`.
    /// - `subdir/FEATURE_RED/` sets `red.bool` for label `A` and adds
    ///   feature `BLUE` and component `LEG`.
    /// - `COMPONENT_LEG/` declares `number-of-fingers`.
    /// - `subdir/FEATURE_BROWN/` would clobber `red.bool`, but nothing ever
    ///   activates `BROWN`.
    pub fn cascade_files() -> Vec<(PathBuf, String)> {
        vec![
            (
                PathBuf::from("TARGET_A/mbed_lib.json"),
                r#"{
                    "name": "a",
                    "config": {"number": 123},
                    "target_overrides": {"*": {"target.features_add": ["RED"]}}
                }"#
                .to_string(),
            ),
            (
                PathBuf::from("subdir/FEATURE_RED/mbed_lib.json"),
                r#"{
                    "name": "red",
                    "config": {"bool": false},
                    "target_overrides": {
                        "A": {
                            "bool": true,
                            "target.features_add": ["BLUE"],
                            "target.components_add": ["LEG"]
                        }
                    },
                    "macros": ["RED_MACRO"]
                }"#
                .to_string(),
            ),
            (
                PathBuf::from("COMPONENT_LEG/mbed_lib.json"),
                r#"{"name": "leg", "config": {"number-of-fingers": 5}, "macros": ["LEG_MACRO"]}"#
                    .to_string(),
            ),
            (
                PathBuf::from("subdir/FEATURE_BROWN/mbed_lib.json"),
                r#"{
                    "name": "brown",
                    "target_overrides": {"*": {"red.bool": "DON'T USE ME"}},
                    "macros": ["DONT_USE_THIS_MACRO"]
                }"#
                .to_string(),
            ),
        ]
    }

    pub const CASCADE_APP: &str = r#"{"target_overrides": {"*": {"target.foo": "bar"}}}"#;

    /// Target `A` declaring `target.foo`, plus [`cascade_files`] and an app
    /// file overriding `target.foo`.
    pub fn cascade_target() -> TargetDefinition {
        TargetDefinition {
            config: [("foo".to_string(), serde_json::json!("foo"))]
                .into_iter()
                .collect(),
            ..target("A", &[])
        }
    }

    pub fn cascade_input() -> ResolveInput {
        ResolveInput {
            files: cascade_files(),
            app_file: Some((PathBuf::from("mbed_app.json"), CASCADE_APP.to_string())),
            ..ResolveInput::new(target_source(&cascade_target()))
        }
    }

    #[test]
    fn cascade_sources_parse() {
        for (path, content) in cascade_files() {
            Source::from_definition(&path, &content, true).unwrap();
        }
        target_source(&k64f());
    }
}

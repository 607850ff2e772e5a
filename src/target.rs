//! Target base definitions: the static attributes of each hardware target.
//!
//! A target database is a JSON object keyed by target name:
//!
//! ```json
//! {
//!   "K64F": {
//!     "labels": ["FRDM", "Freescale"],
//!     "features": ["PSA"],
//!     "components": ["SD"],
//!     "macros": ["CPU_MK64FN1M0VMD12"],
//!     "config": {"stdio-baud": 9600}
//!   }
//! }
//! ```
//!
//! Every attribute is optional. Resolving inheritance between targets is the
//! database author's concern; entries here are taken as already flattened.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::BoardfigError;

/// Static attributes of one hardware target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetDefinition {
    /// Filled from the database key.
    #[serde(skip)]
    pub name: String,
    pub labels: Vec<String>,
    pub features: Vec<String>,
    pub components: Vec<String>,
    pub macros: Vec<String>,
    pub config: BTreeMap<String, serde_json::Value>,
}

/// Lookup table of target definitions by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetDatabase {
    targets: BTreeMap<String, TargetDefinition>,
}

impl TargetDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a database from JSON text. `path` names the file in errors.
    pub fn from_json(path: &Path, content: &str) -> Result<Self, BoardfigError> {
        let targets: BTreeMap<String, TargetDefinition> =
            serde_json::from_str(content).map_err(|e| match e.classify() {
                serde_json::error::Category::Data => BoardfigError::malformed(path, e.to_string()),
                _ => BoardfigError::ParseError {
                    path: path.to_path_buf(),
                    source: e,
                },
            })?;

        let mut db = Self::new();
        for (name, mut def) in targets {
            def.name = name;
            db.insert(def);
        }
        Ok(db)
    }

    /// Read and decode a database file.
    pub fn load(path: &Path) -> Result<Self, BoardfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| BoardfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(path, &content)
    }

    /// Add or replace a definition, keyed by its `name`.
    pub fn insert(&mut self, target: TargetDefinition) {
        self.targets.insert(target.name.clone(), target);
    }

    /// Look up a target by name.
    pub fn get(&self, name: &str) -> Result<&TargetDefinition, BoardfigError> {
        self.targets
            .get(name)
            .ok_or_else(|| BoardfigError::UnknownTarget(name.to_string()))
    }
}

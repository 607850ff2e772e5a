//! Deterministic build configuration assembly for embedded targets.
//!
//! Boardfig takes a hardware target, a program tree containing library
//! definition files, and an optional application file, and folds them into
//! one [`Config`]: every configuration option with its final value and the
//! source that set it, the preprocessor macros to define, and the active
//! label, feature, and component sets.
//!
//! ```ignore
//! let config = Boardfig::builder()
//!     .target("K64F")
//!     .targets_file("targets.json")
//!     .program_root(".")
//!     .assemble()?;
//! ```
//!
//! The same inputs always produce the same `Config`, independent of
//! filesystem enumeration order.
//!
//! # Sources
//!
//! Everything that contributes configuration is first parsed into a
//! [`Source`]:
//!
//! - **Target source**: built from a [`TargetDefinition`]. Seeds the label
//!   set with the target's name and labels, plus its features, components,
//!   macros, and `target.*` options.
//! - **Library files** (`mbed_lib.json`): declare options under their own
//!   `name` namespace, add macros, mutate label sets, and carry
//!   `target_overrides` blocks keyed by label (or `"*"` for every target).
//! - **Application file** (`mbed_app.json`): same shape under the `app`
//!   namespace, folded last so its overrides win.
//!
//! # Scoped directories
//!
//! A file whose path contains `TARGET_<name>`, `FEATURE_<name>` or
//! `COMPONENT_<name>` directories applies only while every such scope is
//! active. Scopes nest: `TARGET_A/FEATURE_RED/mbed_lib.json` needs both
//! label `A` and feature `RED`. Paths are scoped relative to the program
//! root, so directories above the program never restrict anything.
//!
//! # Cascade
//!
//! Folding a file can activate new labels, features, or components, which
//! makes more files eligible. [`resolve`] repeats rounds until one folds
//! nothing:
//!
//! ```text
//! target source
//!        ↓
//! round 1   files eligible under the target's label sets, in path order
//!        ↓
//! round 2   files newly eligible after round 1, in path order
//!        ↓
//!   ...     until no new file is eligible
//!        ↓
//! application file
//! ```
//!
//! Inclusion is sticky: a folded file stays folded even if a later file
//! removes the scope that admitted it. A file never folded contributes
//! nothing, including its macros and label changes.
//!
//! # Override blocks
//!
//! Within one source, the `"*"` block applies first and then every block
//! whose key is in the active label set, in name order. The label snapshot
//! is taken once per source, after its own top-level label changes. Keys in
//! a block are namespace-qualified against the source (`"bool"` in library
//! `red` means `red.bool`); `target.*_add`, `target.*_remove` and
//! `target.macros_add` mutate sets instead of options.
//!
//! # Settings
//!
//! File names, the generated macro prefix, strictness, and the directories
//! skipped during discovery come from [`Settings`], loaded through confique
//! from defaults, a `boardfig.toml`, and `BOARDFIG_*` environment variables.
//! Individual builder setters override single fields.
//!
//! # Strict mode
//!
//! Strict mode is **off by default**: unknown top-level keys in a definition
//! file are logged with a warning and ignored. Keys such as `requires` that
//! Mbed programs carry for other tools are always accepted. With
//! [`.strict(true)`](BoardfigBuilder::strict), an unknown key fails with the
//! file path, key name, and line number:
//!
//! ```text
//! Unknown key 'confg' in libs/sensor/mbed_lib.json (line 3)
//! ```
//!
//! Content that is not valid JSON, or JSON of the wrong shape, always fails
//! with [`BoardfigError::MalformedDefinition`] naming the file.
//!
//! # Consumer operations
//!
//! [`ConfigAction`] describes what to do with an assembled config (`List`,
//! `Get`, `Labels`) without tying it to a CLI framework.
//! [`BoardfigBuilder::handle`] runs one and returns a displayable
//! [`ConfigResult`]. With the `clap` feature (on by default), [`ConfigArgs`]
//! embeds `config list|get|labels` into any clap derive parser.
//!
//! # Error handling
//!
//! All fallible operations return [`BoardfigError`]. Malformed definitions
//! name the offending file; assembly fails fast and never returns a partial
//! config.

pub mod config;
pub mod error;
pub mod filter;
pub mod resolve;
pub mod settings;
pub mod source;
pub mod target;
pub mod types;

mod builder;
#[cfg(feature = "clap")]
mod cli;
mod file;
mod ops;
mod validate;

#[cfg(test)]
mod fixtures;

pub use builder::{Boardfig, BoardfigBuilder};
#[cfg(feature = "clap")]
pub use cli::{ConfigArgs, ConfigSubcommand};
pub use config::{Config, ConfigOption, Macro};
pub use error::BoardfigError;
pub use ops::ConfigResult;
pub use resolve::{ResolveInput, resolve};
pub use settings::Settings;
pub use source::Source;
pub use target::{TargetDatabase, TargetDefinition};
pub use types::{ConfigAction, LabelSets, OutputFormat, Value};

//! Clap adapter for boardfig.
//!
//! Compiled only when the `clap` Cargo feature is enabled (on by default).
//! [`ConfigArgs`] and [`ConfigSubcommand`] embed into an application's
//! `#[derive(Parser)]` struct to provide `config list|get|labels`.
//!
//! The only bridge to the core is [`ConfigArgs::into_action()`], which
//! converts clap-parsed arguments into a [`ConfigAction`](crate::ConfigAction).
//! From there, all logic flows through the clap-free
//! [`BoardfigBuilder::handle()`](crate::BoardfigBuilder::handle) API.

use clap::{Args, Subcommand};

use crate::types::{ConfigAction, OutputFormat};

/// Clap-derived args for the `config` subcommand group.
///
/// ```ignore
/// #[derive(Subcommand)]
/// enum Commands {
///     Config(ConfigArgs),
/// }
/// ```
#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigSubcommand>,
}

/// Available config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigSubcommand {
    /// Show every resolved option and macro.
    List {
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Show the resolved value, macro name, and origin of one option.
    Get {
        /// Fully-qualified option key (e.g. "app.baud-rate").
        key: String,
    },
    /// Show the resolved label, feature, and component sets.
    Labels,
}

impl ConfigArgs {
    /// Convert clap-parsed args into a framework-agnostic `ConfigAction`.
    ///
    /// Bare `config` (no subcommand) lists in text format.
    pub fn into_action(self) -> ConfigAction {
        match self.action {
            None => ConfigAction::List {
                format: OutputFormat::Text,
            },
            Some(ConfigSubcommand::List { format }) => ConfigAction::List { format },
            Some(ConfigSubcommand::Get { key }) => ConfigAction::Get { key },
            Some(ConfigSubcommand::Labels) => ConfigAction::Labels,
        }
    }
}

//! boardfig CLI: assemble and inspect a target's build configuration.
//!
//! ```sh
//! boardfig --target K64F --targets targets.json config list
//! boardfig --target K64F --targets targets.json config get app.baud-rate
//! boardfig --target K64F --targets targets.json --program ../app config labels
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use boardfig::{Boardfig, BoardfigBuilder, BoardfigError, ConfigArgs, Settings};

/// Assemble the build configuration of an embedded target.
#[derive(Parser, Debug)]
#[command(name = "boardfig", version)]
struct Cli {
    /// Target to assemble for (e.g. K64F).
    #[arg(short = 'm', long, global = true)]
    target: Option<String>,

    /// JSON target database.
    #[arg(long, global = true)]
    targets: Option<PathBuf>,

    /// Root of the program tree to scan.
    #[arg(long, global = true, default_value = ".")]
    program: PathBuf,

    /// Application file to fold last (default: <program>/mbed_app.json).
    #[arg(long, global = true)]
    app_file: Option<PathBuf>,

    /// Engine settings file (TOML).
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Fail on unknown keys in definition files instead of warning.
    #[arg(long, global = true)]
    strict: bool,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Inspect the assembled configuration (list, get, labels).
    Config(ConfigArgs),
}

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), BoardfigError> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("boardfig=debug")
    } else {
        EnvFilter::new("boardfig=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::load(cli.settings.as_deref())?;
    let builder = make_builder(&cli, settings)?;

    match cli.command {
        Commands::Config(args) => builder.handle_and_print(&args.into_action()),
    }
}

fn make_builder(cli: &Cli, settings: Settings) -> Result<BoardfigBuilder, BoardfigError> {
    let target = cli.target.as_deref().ok_or(BoardfigError::TargetRequired)?;
    let targets = cli.targets.as_ref().ok_or(BoardfigError::TargetsRequired)?;

    let mut builder = Boardfig::builder()
        .settings(settings)
        .target(target)
        .targets_file(targets)
        .program_root(&cli.program);
    if let Some(app) = &cli.app_file {
        builder = builder.app_file(app);
    }
    if cli.strict {
        builder = builder.strict(true);
    }
    Ok(builder)
}

//! Cascade resolution: decide which definition files apply, in what order,
//! and fold them into one [`Config`].
//!
//! Operates on pre-loaded data (`ResolveInput`) with no I/O, making the full
//! pipeline testable with synthetic inputs. Steps:
//!
//! 1. Fold the target's seed source
//! 2. Sort candidate files by path (relative to the program root)
//! 3. Repeat until a round folds nothing: pick every not-yet-folded file the
//!    eligibility filter accepts under the round-start label sets, then parse
//!    and fold each in path order
//! 4. Fold the application file last, once
//!
//! Termination: every round that continues folds at least one file, and a
//! folded file is never reconsidered, so there are at most as many rounds as
//! candidates. Inclusion is sticky: a file whose scope is later removed stays
//! folded.

use std::path::{Path, PathBuf};

use crate::config::{Config, DEFAULT_MACRO_PREFIX};
use crate::error::BoardfigError;
use crate::filter;
use crate::source::Source;

/// All pre-loaded data needed to assemble a config. No I/O happens here.
pub struct ResolveInput {
    /// The target's seed source.
    pub target: Source,
    /// Candidate library files as `(path, content)`, in any order.
    pub files: Vec<(PathBuf, String)>,
    /// The application file, folded last.
    pub app_file: Option<(PathBuf, String)>,
    /// Candidate paths are made relative to this before filtering and
    /// ordering, so directories above the program never scope a file.
    pub program_root: Option<PathBuf>,
    /// Whether to reject unknown top-level keys in definition files.
    pub strict: bool,
    /// Prefix for generated option macro names.
    pub macro_prefix: String,
}

impl ResolveInput {
    /// Input with no candidate files, lenient parsing, and default prefix.
    pub fn new(target: Source) -> Self {
        ResolveInput {
            target,
            files: vec![],
            app_file: None,
            program_root: None,
            strict: false,
            macro_prefix: DEFAULT_MACRO_PREFIX.to_string(),
        }
    }
}

struct Candidate {
    /// Relative path used for scoping and ordering.
    scope_path: PathBuf,
    path: PathBuf,
    content: String,
}

/// Resolve a config from pre-loaded inputs.
///
/// Fails fast on the first malformed definition; no partial config is
/// returned.
pub fn resolve(input: ResolveInput) -> Result<Config, BoardfigError> {
    let mut config = Config::with_macro_prefix(&input.macro_prefix);
    config.fold(&input.target);

    let mut pending = candidates(input.files, input.program_root.as_deref());
    let mut round = 0;

    loop {
        let snapshot = config.active().clone();
        let (eligible, rest): (Vec<_>, Vec<_>) = pending
            .into_iter()
            .partition(|c| filter::is_eligible(&c.scope_path, &snapshot));
        pending = rest;

        if eligible.is_empty() {
            break;
        }

        round += 1;
        tracing::debug!("Cascade round {}: {} newly eligible file(s)", round, eligible.len());

        for candidate in eligible {
            let source = Source::from_definition(&candidate.path, &candidate.content, input.strict)?;
            config.fold(&source);
        }
    }

    for skipped in &pending {
        tracing::debug!("Not applied (scope inactive): {}", skipped.scope_path.display());
    }

    if let Some((path, content)) = &input.app_file {
        let app = Source::from_app(path, content, input.strict)?;
        config.fold(&app);
    }

    tracing::info!(
        "Resolved {} option(s) and {} macro(s) in {} cascade round(s)",
        config.options.len(),
        config.macros.len(),
        round
    );
    Ok(config)
}

/// Relativize, sort, and deduplicate candidate files.
///
/// Ties on the relative path are broken by the full path and then the
/// content, so which duplicate survives never depends on input order.
fn candidates(files: Vec<(PathBuf, String)>, root: Option<&Path>) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = files
        .into_iter()
        .map(|(path, content)| {
            let scope_path = root
                .and_then(|root| path.strip_prefix(root).ok())
                .unwrap_or(&path)
                .to_path_buf();
            Candidate {
                scope_path,
                path,
                content,
            }
        })
        .collect();
    candidates.sort_by(|a, b| {
        (&a.scope_path, &a.path, &a.content).cmp(&(&b.scope_path, &b.path, &b.content))
    });
    candidates.dedup_by(|a, b| a.scope_path == b.scope_path);
    candidates
}

//! File eligibility: directory segments named `TARGET_<x>`, `FEATURE_<x>`, or
//! `COMPONENT_<x>` scope every file beneath them to `<x>` being active in the
//! target labels, features, or components respectively. Scopes along one path
//! compose with AND; an unscoped file is always eligible.

use std::borrow::Cow;
use std::path::{Component, Path};

use crate::types::{LabelKind, LabelSets};

/// Whether `path` (relative to the program root) is eligible under `active`.
pub fn is_eligible(path: &Path, active: &LabelSets) -> bool {
    scopes(path).all(|(kind, name)| active.contains(kind, &name))
}

/// The `(kind, name)` scopes named by the directory segments of `path`.
///
/// The final component is the file name and never scopes. A segment that is
/// not valid UTF-8 is decoded lossily, so it still scopes but never matches.
pub fn scopes(path: &Path) -> impl Iterator<Item = (LabelKind, Cow<'_, str>)> {
    let dirs = path.parent().unwrap_or(Path::new(""));
    dirs.components().filter_map(|component| match component {
        Component::Normal(segment) => scope_of(segment.to_string_lossy()),
        _ => None,
    })
}

fn scope_of(segment: Cow<'_, str>) -> Option<(LabelKind, Cow<'_, str>)> {
    let kind = LabelKind::ALL.into_iter().find(|kind| {
        let prefix = kind.dir_prefix();
        segment.len() > prefix.len() && segment.starts_with(prefix)
    })?;
    let start = kind.dir_prefix().len();
    let name = match segment {
        Cow::Borrowed(s) => Cow::Borrowed(&s[start..]),
        Cow::Owned(s) => Cow::Owned(s[start..].to_string()),
    };
    Some((kind, name))
}

//! label conflict resolution across hierarchy levels
//!
//! Generation labels are global identifiers for output artifacts. A label
//! may be defined exactly once on the whole root-to-stack path: redefining
//! it at another level is an error, not an override. Silent shadowing would
//! hide collisions between unrelated configuration authors at different
//! directory scopes.
use crate::directive::Directive;
use crate::hierarchy::Level;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::path::PathBuf;

/// Winning directives keyed by label, in root-to-stack, document order
pub type ResolvedSet = IndexMap<String, Directive>;

/// Applies the uniqueness rules to the collected levels
///
/// Per-level uniqueness is checked for every level first, then labels are
/// accumulated root-to-stack. Violations surface in that deterministic
/// order, so identical inputs always report the same conflict.
pub fn resolve(levels: Vec<Level>) -> Result<ResolvedSet, ConflictError> {
    for level in &levels {
        let mut seen: HashMap<&str, &Directive> = HashMap::new();

        for directive in &level.directives {
            if let Some(existing) = seen.insert(directive.label.as_str(), directive) {
                tracing::debug!(label = %directive.label, dir = %level.dir.display(), "label collision");
                return Err(ConflictError::SameLevel {
                    label: directive.label.clone(),
                    dir: level.dir.clone(),
                    first_origin: existing.origin.clone(),
                    second_origin: directive.origin.clone(),
                });
            }
        }
    }

    let mut winners = ResolvedSet::new();
    for level in levels {
        for directive in level.directives {
            if let Some(existing) = winners.get(&directive.label) {
                tracing::debug!(label = %directive.label, "label collision");
                return Err(ConflictError::CrossLevel {
                    label: directive.label.clone(),
                    first_dir: existing.dir.clone(),
                    second_dir: directive.dir.clone(),
                });
            }

            winners.insert(directive.label.clone(), directive);
        }
    }

    Ok(winners)
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConflictError {
    /// Same label twice within one hierarchy level
    #[error(
        "generate label \"{label}\" is defined twice in {} ({} and {})",
        .dir.display(), .first_origin.display(), .second_origin.display()
    )]
    SameLevel {
        label: String,
        dir: PathBuf,
        first_origin: PathBuf,
        second_origin: PathBuf,
    },
    /// Same label at two distinct hierarchy levels
    #[error(
        "generate label \"{label}\" is defined at {} and redefined at {}",
        .first_dir.display(), .second_dir.display()
    )]
    CrossLevel {
        label: String,
        first_dir: PathBuf,
        second_dir: PathBuf,
    },
}

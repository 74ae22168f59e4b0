//! engine facade
//!
//! One resolution request per stack: collect directives root-to-stack,
//! resolve label conflicts, then partially evaluate and render every winning
//! template. Requests hold no shared state and are independent of each
//! other, so a multi-stack run may resolve stacks concurrently as long as
//! each request owns its own [EvalContext] snapshot.
use crate::directive::ParseError;
use crate::document_tree::DocumentTree;
use crate::eval::{self, EvalContext, EvalError};
use crate::hierarchy;
use crate::resolve::{self, ConflictError};
use crate::serialize;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

/// Generated bodies keyed by label, in root-to-stack, document order
pub type ResolutionResult = IndexMap<String, GeneratedBody>;

/// Final output for one label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedBody {
    pub label: String,
    /// Canonically rendered configuration body
    pub code: String,
    /// Configuration file that defined the winning directive
    pub origin: PathBuf,
}

/// Everything that can fail a resolution request
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Conflict(#[from] ConflictError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Generates all configuration bodies for the stack described by `context`
///
/// The first failure at any stage aborts the whole call; no partial result
/// is returned.
pub fn generate(tree: &DocumentTree, context: &EvalContext) -> Result<ResolutionResult, Error> {
    let stack_dir = Path::new(&context.meta().path);
    tracing::debug!(stack = %stack_dir.display(), "resolving stack");

    let levels = hierarchy::collect(tree, stack_dir)?;
    let resolved = resolve::resolve(levels)?;

    let mut result = ResolutionResult::new();
    for (label, directive) in resolved {
        let mut template = directive.template;
        eval::partial_eval(&mut template, context)?;

        result.insert(
            label.clone(),
            GeneratedBody {
                label,
                code: serialize::render(&template),
                origin: directive.origin,
            },
        );
    }

    tracing::debug!(stack = %context.meta().path, generated = result.len(), "stack resolved");
    Ok(result)
}

//! # strata - hierarchical code generation for stack trees
//!
//! `strata` manages a tree of stacks (directories representing deployable
//! units) and generates configuration for them from hierarchical,
//! inheritable `generate` directives.
//!
//! ## Introduction for developers
//!
//! Read this to understand how the generation engine works internally.
//!
//! ### HCL Terms
//!
//! Quick introduction to terms used to describe elements of HCL documents.
//!
//! In hcl terms...
//! - a file gets parsed as a `body`
//! - ...which is just a list of `structures`
//! - ...where there are two kinds:
//!   - `attribute`: a "key = value" pair
//!   - or `block`:
//!     - 1 `identifier`
//!     - followed by 0 or more `labels`
//!     - and a `body` enclosed in `{` and `}`
//!
//! A generation directive is a block like this:
//!
//! ```hcl
//! generate "main" {
//!   content {
//!     backend "s3" {
//!       region = global.region
//!       key    = "${strata.path}/state"
//!     }
//!   }
//! }
//! ```
//!
//! ### Collecting directives
//!
//! Configuration documents are grouped by their project-relative directory in
//! a [document_tree::DocumentTree]. Locating documents on disk is the job of
//! an outer layer; [document_tree::DocumentTree::load_directory] is the seam
//! it plugs into, and tests build trees inline with [document_tree!].
//!
//! For one stack, [hierarchy::collect] walks the directory path from the
//! project root (`/`) down to the stack and parses every `generate` block of
//! every document along the way into a [directive::Directive] — see
//! [directive::Directive::parse] for the shape rules. Documents may contain
//! other blocks (`globals`, stack settings, ...); those belong to other
//! subsystems and are skipped here.
//!
//! ### Resolving conflicts
//!
//! Directive labels name output artifacts, so they must be unique across the
//! whole root-to-stack path. [resolve::resolve] rejects duplicates within one
//! directory and redefinitions across directories — there is no
//! "closest wins" shadowing. See [resolve::ConflictError].
//!
//! ### Partial evaluation
//!
//! A template mixes two expression languages: references to data `strata`
//! knows (the `global` and `strata` namespaces) and expressions owned by the
//! downstream toolchain (`local`, `resource`, ...). [eval::partial_eval]
//! walks every attribute expression, decides per expression whether all of
//! its traversal roots are known, and either evaluates it fully via
//! `hcl::eval` or preserves the original source text byte for byte. The
//! fallback construct `try(...)` is resolved with real fallback semantics
//! before evaluation.
//!
//! ### Output
//!
//! [serialize::render] turns the evaluated template into canonical text:
//! attributes first, sorted by name, then nested blocks in declaration
//! order. Evaluated values are encoded by [value::encode] with object keys
//! sorted at every depth, so identical inputs always produce identical
//! output.
//!
//! [engine::generate] ties the stages together for one stack and returns the
//! label-keyed [engine::ResolutionResult]. Writing the generated bodies to
//! disk (and drift detection against existing files) happens outside this
//! crate.
pub mod directive;
pub mod document_tree;
pub mod engine;
pub mod eval;
pub mod hierarchy;
pub mod resolve;
pub mod serialize;
pub mod value;
mod visit;

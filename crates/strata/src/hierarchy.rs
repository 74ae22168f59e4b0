//! root-to-stack collection of generation directives
//!
//! Stacks live in a directory tree whose root is the project-relative path
//! `/`. Every directory on the way from the root down to a stack may
//! contribute directives, and the walk order (root first, stack last,
//! documents in insertion order) is what makes resolution deterministic.
use crate::directive::{Directive, ParseError, GENERATE_IDENT};
use crate::document_tree::DocumentTree;
use std::path::{Path, PathBuf};

/// One directory on the root-to-stack path and the directives it contributes
#[derive(Debug, derive_new::new)]
pub struct Level {
    pub dir: PathBuf,
    #[new(default)]
    pub directives: Vec<Directive>,
}

/// Collects every directive defined on the path from the project root down
/// to and including `stack_dir`, root first.
///
/// A directory without directives contributes an empty level; "no
/// generation" is valid. The first malformed directive aborts the whole
/// collection, no matter which level it sits on.
pub fn collect(tree: &DocumentTree, stack_dir: &Path) -> Result<Vec<Level>, ParseError> {
    assert!(
        stack_dir.has_root(),
        "stack path must be project-rooted: {}",
        stack_dir.display()
    );

    let mut dirs: Vec<&Path> = stack_dir.ancestors().collect();
    dirs.reverse();

    let mut levels = Vec::with_capacity(dirs.len());
    for dir in dirs {
        let mut level = Level::new(dir.to_path_buf());

        for document in tree.documents_at(dir) {
            for block in document.body.blocks() {
                if block.ident.value().as_str() != GENERATE_IDENT {
                    continue;
                }

                level
                    .directives
                    .push(Directive::parse(block, &document.source, dir)?);
            }
        }

        tracing::trace!(
            dir = %level.dir.display(),
            directives = level.directives.len(),
            "collected level"
        );
        levels.push(level);
    }

    Ok(levels)
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn labels(level: &Level) -> Vec<&str> {
        level
            .directives
            .iter()
            .map(|directive| directive.label.as_str())
            .collect()
    }

    #[test]
    fn walks_root_to_stack() {
        let tree = crate::document_tree! {
            "/strata.hcl" => "generate \"on_root\" {\n  content {\n  }\n}",
            "/stacks/strata.hcl" => "generate \"on_parent\" {\n  content {\n  }\n}",
            "/stacks/stack/strata.hcl" => "generate \"on_stack\" {\n  content {\n  }\n}"
        };

        let levels = collect(&tree, Path::new("/stacks/stack")).expect("must collect");

        let dirs: Vec<_> = levels.iter().map(|level| level.dir.clone()).collect();
        assert_eq!(
            dirs,
            vec![
                PathBuf::from("/"),
                PathBuf::from("/stacks"),
                PathBuf::from("/stacks/stack")
            ]
        );

        assert_eq!(labels(&levels[0]), ["on_root"]);
        assert_eq!(labels(&levels[1]), ["on_parent"]);
        assert_eq!(labels(&levels[2]), ["on_stack"]);
    }

    #[test]
    fn directories_without_directives_contribute_empty_levels() {
        let tree = crate::document_tree! {
            "/stacks/stack/strata.hcl" => "generate \"only\" {\n  content {\n  }\n}"
        };

        let levels = collect(&tree, Path::new("/stacks/stack")).expect("must collect");

        assert_eq!(levels.len(), 3);
        assert!(levels[0].directives.is_empty());
        assert!(levels[1].directives.is_empty());
        assert_eq!(labels(&levels[2]), ["only"]);
    }

    #[test]
    fn skips_structures_owned_by_other_subsystems() {
        let tree = crate::document_tree! {
            "/stack/strata.hcl" => r#"
            stack_setting = "ignored"

            globals {
              some_string = "string"
            }

            generate "test" {
              content {
              }
            }
            "#
        };

        let levels = collect(&tree, Path::new("/stack")).expect("must collect");
        assert_eq!(labels(&levels[1]), ["test"]);
    }

    #[test]
    fn directives_follow_document_order() {
        let tree = crate::document_tree! {
            "/a.strata.hcl" => r#"
            generate "one" {
              content {
              }
            }

            generate "two" {
              content {
              }
            }
            "#,
            "/b.strata.hcl" => "generate \"three\" {\n  content {\n  }\n}"
        };

        let levels = collect(&tree, Path::new("/")).expect("must collect");
        assert_eq!(labels(&levels[0]), ["one", "two", "three"]);
    }

    #[test]
    fn malformed_directive_on_any_level_is_fatal() {
        let tree = crate::document_tree! {
            "/stacks/strata.hcl" => "generate {\n  content {\n  }\n}",
            "/stacks/stack/strata.hcl" => "generate \"valid\" {\n  content {\n  }\n}"
        };

        let error = collect(&tree, Path::new("/stacks/stack")).expect_err("must fail");
        assert!(matches!(error, ParseError::NoLabel { .. }));
    }
}

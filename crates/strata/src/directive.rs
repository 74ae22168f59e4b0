//! parsing of `generate` directive blocks
//!
//! A directive is one unit of code generation:
//!
//! ```hcl
//! generate "label" {
//!   content {
//!     # payload of the generated document
//!   }
//! }
//! ```
//!
//! The label is the identity of the generated artifact. The reserved
//! `content` block wraps the template payload and is the only structure
//! allowed directly inside `generate`. The payload itself is opaque at this
//! point: it may contain arbitrary attributes and arbitrarily nested,
//! arbitrarily labeled blocks meant for the downstream toolchain.
use hcl_edit::structure::{Block, Body, Structure};
use std::path::{Path, PathBuf};

/// Block identifier that marks a directive
pub const GENERATE_IDENT: &str = "generate";

/// Reserved wrapper block holding the template payload
const CONTENT_IDENT: &str = "content";

/// One parsed generation directive
#[derive(Debug, Clone)]
pub struct Directive {
    /// Identity of the generated artifact
    pub label: String,
    /// Unevaluated template payload (the `content` body)
    pub template: Body,
    /// Configuration file the directive was parsed from
    pub origin: PathBuf,
    /// Hierarchy directory the directive belongs to
    pub dir: PathBuf,
}

impl Directive {
    /// Validates the structural shape of a `generate` block
    pub fn parse(block: &Block, origin: &Path, dir: &Path) -> Result<Self, ParseError> {
        if block.labels.is_empty() {
            return Err(ParseError::NoLabel {
                origin: origin.to_path_buf(),
            });
        }

        if block.labels.len() > 1 {
            return Err(ParseError::TooManyLabels {
                origin: origin.to_path_buf(),
            });
        }

        let label = block.labels[0].as_str().to_string();
        if label.is_empty() {
            return Err(ParseError::EmptyLabel {
                origin: origin.to_path_buf(),
            });
        }

        let mut content: Option<&Block> = None;
        for structure in block.body.iter() {
            match structure {
                Structure::Attribute(attribute) => {
                    return Err(ParseError::UnexpectedAttribute {
                        label,
                        name: attribute.key.value().to_string(),
                        origin: origin.to_path_buf(),
                    })
                }
                Structure::Block(inner) if inner.ident.value().as_str() == CONTENT_IDENT => {
                    if !inner.labels.is_empty() {
                        return Err(ParseError::LabeledContent {
                            label,
                            origin: origin.to_path_buf(),
                        });
                    }

                    if content.is_some() {
                        return Err(ParseError::DuplicateContent {
                            label,
                            origin: origin.to_path_buf(),
                        });
                    }

                    content = Some(inner);
                }
                Structure::Block(inner) => {
                    return Err(ParseError::UnexpectedBlock {
                        label,
                        name: inner.ident.value().to_string(),
                        origin: origin.to_path_buf(),
                    })
                }
            }
        }

        let Some(content) = content else {
            return Err(ParseError::MissingContent {
                label,
                origin: origin.to_path_buf(),
            });
        };

        Ok(Self {
            label,
            template: content.body.clone(),
            origin: origin.to_path_buf(),
            dir: dir.to_path_buf(),
        })
    }
}

/// Structural defects of a `generate` block
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("generate block in {} has no label", .origin.display())]
    NoLabel { origin: PathBuf },
    #[error("generate block in {} has more than one label", .origin.display())]
    TooManyLabels { origin: PathBuf },
    #[error("generate block in {} has an empty label", .origin.display())]
    EmptyLabel { origin: PathBuf },
    #[error("generate block \"{label}\" in {} has no content block", .origin.display())]
    MissingContent { label: String, origin: PathBuf },
    #[error("generate block \"{label}\" in {} has more than one content block", .origin.display())]
    DuplicateContent { label: String, origin: PathBuf },
    #[error("content block of generate \"{label}\" in {} must not have labels", .origin.display())]
    LabeledContent { label: String, origin: PathBuf },
    #[error("generate block \"{label}\" in {} has unexpected attribute \"{name}\"", .origin.display())]
    UnexpectedAttribute {
        label: String,
        name: String,
        origin: PathBuf,
    },
    #[error("generate block \"{label}\" in {} has unexpected block \"{name}\"", .origin.display())]
    UnexpectedBlock {
        label: String,
        name: String,
        origin: PathBuf,
    },
}

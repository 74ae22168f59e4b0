//! collection of configuration documents grouped by project directory
//!
//! [DocumentTree] tracks, for every project-relative directory, the parsed
//! documents found directly in it together with their source path. The source
//! path is stored so errors and origins can point at the defining file.
//! Insertion order per directory is preserved; it is the order directives are
//! later collected in.
use hcl_edit::structure::Body;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

/// Name of the default configuration file of a directory
pub const DEFAULT_FILENAME: &str = "strata.hcl";

#[derive(Default, Debug)]
pub struct DocumentTree {
    directories: IndexMap<PathBuf, Vec<Document>>,
}

/// One parsed configuration document and where it came from
#[derive(Debug)]
pub struct Document {
    pub source: PathBuf,
    pub body: Body,
}

impl DocumentTree {
    /// Inserts a parsed document under the directory of its source path
    pub fn insert(&mut self, source: impl Into<PathBuf>, body: Body) {
        let source = source.into();
        let dir = source
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/"));

        self.directories
            .entry(dir)
            .or_default()
            .push(Document { source, body });
    }

    /// All documents directly inside `dir`, in insertion order
    pub fn documents_at(&self, dir: &Path) -> impl Iterator<Item = &Document> {
        self.directories.get(dir).into_iter().flatten()
    }

    pub fn document_count(&self) -> usize {
        self.directories.values().map(Vec::len).sum()
    }
}

impl DocumentTree {
    /// Loads one configuration file, filing it under `source` (the
    /// project-relative path it should be known as)
    pub fn load_file(&mut self, file_path: &Path, source: &Path) -> Result<(), LoadError> {
        tracing::info!(path=%file_path.display(), "loading file");

        let file_contents = std::fs::read_to_string(file_path)?;
        let body = hcl_edit::parser::parse_body(&file_contents)?;

        self.insert(source, body);
        Ok(())
    }

    /// Loads all configuration files found directly in `dir_path`, filing
    /// them under the project-relative directory `project_dir`
    ///
    /// Matching files are read in sorted name order so collection stays
    /// reproducible across platforms. A directory without configuration
    /// files loads nothing; "no configuration here" is valid.
    pub fn load_directory(
        &mut self,
        dir_path: &Path,
        project_dir: &Path,
    ) -> Result<(), LoadError> {
        let mut file_names = Vec::new();

        for dir_entry in std::fs::read_dir(dir_path)? {
            let dir_entry = dir_entry?;
            if !dir_entry.file_type()?.is_file() {
                continue;
            }

            let is_config_file = dir_entry
                .file_name()
                .to_string_lossy()
                .ends_with(DEFAULT_FILENAME);
            if is_config_file {
                file_names.push(dir_entry.file_name());
            }
        }

        file_names.sort();

        for file_name in file_names {
            self.load_file(&dir_path.join(&file_name), &project_dir.join(&file_name))?;
        }

        Ok(())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("IO error")]
    Io(#[from] std::io::Error),
    #[error("Unable to parse hcl file")]
    HclParseFailed(#[from] hcl_edit::parser::Error),
}

/// Utility macro to create a [DocumentTree] from inline documents
///
/// ```
/// # use strata::document_tree;
/// document_tree! {
///   "/strata.hcl" => "project_name = \"demo\"",
///   "/stack/strata.hcl" => ""
/// };
/// ```
///
/// # Panic
/// Panics on invalid input
///
/// ```should_panic
/// # use strata::document_tree;
/// document_tree! { "/strata.hcl" => "not = valid = hcl" };
/// ```
#[macro_export]
macro_rules! document_tree {
    { $($source:expr => $content:expr),+ $(,)? } => {{
        let mut tree = $crate::document_tree::DocumentTree::default();
        $(
            tree.insert(
                $source,
                hcl_edit::parser::parse_body($content).expect("body must parse"),
            );
        )+

        tree
    }};
}

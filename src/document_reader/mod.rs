// Reads a corpus of HTML documents for indexing. The corpus directory is
// walked recursively and every .html file becomes one document. Document
// ids come from the file stems when all of them are distinct numbers, and
// from the position in path order otherwise.

pub mod html;

use anyhow::{Context, Result};
use log::warn;
use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

pub struct DocumentReader {
    documents: Vec<(u32, PathBuf)>,
}

impl DocumentReader {
    /// Plans the corpus under `docs_directory`. Paths are sorted so both
    /// id assignment modes are stable across runs.
    pub fn new(docs_directory: &Path) -> Result<Self> {
        let mut paths = Vec::new();
        collect_html_files(docs_directory, &mut paths).with_context(|| {
            format!("Failed to walk corpus directory {}", docs_directory.display())
        })?;
        paths.sort();

        let documents = match numeric_ids(&paths) {
            Some(ids) => ids.into_iter().zip(paths).collect(),
            None => paths
                .into_iter()
                .enumerate()
                .map(|(position, path)| (position as u32, path))
                .collect(),
        };

        Ok(DocumentReader { documents })
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// One item per planned document, already reduced to plain text. A
    /// file that fails to read comes out as `None` after a warning, so a
    /// single bad document never aborts the build.
    pub fn process_documents(&self) -> impl Iterator<Item = Option<(u32, String)>> + '_ {
        self.documents
            .iter()
            .map(|(doc_id, path)| match fs::read_to_string(path) {
                Ok(contents) => Some((*doc_id, html::strip_tags(&contents))),
                Err(error) => {
                    warn!("Failed to process indexable file {}: {}", path.display(), error);
                    None
                }
            })
    }
}

fn collect_html_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_html_files(&path, files)?;
        } else if has_html_extension(&path) {
            files.push(path);
        }
    }
    Ok(())
}

fn has_html_extension(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map_or(false, |ext| ext.eq_ignore_ascii_case("html"))
}

// File stems as document ids, but only if every stem parses and no id
// appears twice; mixing parsed and positional ids would invite collisions.
fn numeric_ids(paths: &[PathBuf]) -> Option<Vec<u32>> {
    let mut seen = HashSet::new();
    let mut ids = Vec::with_capacity(paths.len());

    for path in paths {
        let id = path.file_stem()?.to_str()?.parse::<u32>().ok()?;
        if !seen.insert(id) {
            return None;
        }
        ids.push(id);
    }
    Some(ids)
}

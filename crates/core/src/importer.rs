//! Reconciles the watched directory against the catalog and registers new scans.

use crate::config::ScanConfig;
use crate::error::ImportError;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use storage::Catalog;
use tokio::task;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Which directory entries count as documents.
#[derive(Debug, Clone)]
pub struct FileFilter {
    patterns: GlobSet,
    match_all: bool,
    include_hidden: bool,
}

impl FileFilter {
    /// An empty pattern list accepts every file name.
    pub fn new(patterns: &[String], include_hidden: bool) -> Result<Self, ImportError> {
        Ok(Self {
            patterns: build_globset(patterns)?,
            match_all: patterns.is_empty(),
            include_hidden,
        })
    }

    pub fn from_config(scan: &ScanConfig) -> Result<Self, ImportError> {
        Self::new(&scan.patterns, scan.include_hidden)
    }

    pub fn accepts(&self, file_name: &str) -> bool {
        if !self.include_hidden && is_hidden(file_name) {
            return false;
        }
        self.match_all || self.patterns.is_match(file_name)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportSummary {
    pub imported: Vec<String>,
    /// Files that were cataloged by someone else between listing and insert.
    pub skipped: usize,
}

/// Regular files directly inside `dir` that pass `filter` and are not in
/// `known`. Sorted by name.
pub fn find_new_files(
    dir: &Path,
    known: &HashSet<String>,
    filter: &FileFilter,
) -> Result<Vec<String>, ImportError> {
    if !dir.exists() {
        return Err(ImportError::MissingDirectory(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(ImportError::NotADirectory(dir.to_path_buf()));
    }

    let mut found = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| ImportError::Unreadable {
            path: e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| dir.to_path_buf()),
            source: e,
        })?;
        if !entry.path().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            debug!(path = ?entry.path(), "skipping non UTF-8 file name");
            continue;
        };
        if !filter.accepts(name) || known.contains(name) {
            continue;
        }
        found.push(name.to_string());
    }
    found.sort();
    Ok(found)
}

/// Files in `dir` that `import_new_files` would register right now.
pub async fn pending_files(
    dir: &Path,
    filter: &FileFilter,
    catalog: &Catalog,
) -> Result<Vec<String>, ImportError> {
    let known = catalog.filenames().await?;
    list_off_thread(dir.to_path_buf(), known, filter.clone()).await
}

pub async fn import_new_files(
    dir: &Path,
    filter: &FileFilter,
    catalog: &Catalog,
) -> Result<ImportSummary, ImportError> {
    let new_files = pending_files(dir, filter, catalog).await?;

    let mut summary = ImportSummary::default();
    for name in new_files {
        match catalog.create_document(&name).await {
            Ok(_) => summary.imported.push(name),
            Err(e) if e.is_duplicate() => {
                debug!(filename = %name, "already cataloged, skipping");
                summary.skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    info!(
        dir = %dir.display(),
        imported = summary.imported.len(),
        skipped = summary.skipped,
        "import complete"
    );
    Ok(summary)
}

async fn list_off_thread(
    dir: PathBuf,
    known: HashSet<String>,
    filter: FileFilter,
) -> Result<Vec<String>, ImportError> {
    task::spawn_blocking(move || find_new_files(&dir, &known, &filter)).await?
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, ImportError> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = GlobBuilder::new(pat).case_insensitive(true).build()?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

fn is_hidden(file_name: &str) -> bool {
    file_name.starts_with('.')
}

//! One method per user action. Both the CLI subcommands and the browse UI
//! drive the catalog exclusively through `Organizer`.

use crate::config::AppConfig;
use crate::error::ImportError;
use crate::importer::{self, FileFilter, ImportSummary};
use crate::preview::Previewer;
use anyhow::Context;
use std::path::{Path, PathBuf};
use storage::error::CatalogResult;
use storage::{normalize_tag_name, Catalog, Document, DocumentQuery, TagSummary};
use tracing::info;

pub struct Organizer {
    catalog: Catalog,
    scan_dir: PathBuf,
    filter: FileFilter,
    previewer: Previewer,
}

impl Organizer {
    pub fn new(
        catalog: Catalog,
        scan_dir: PathBuf,
        filter: FileFilter,
        previewer: Previewer,
    ) -> Self {
        Self {
            catalog,
            scan_dir,
            filter,
            previewer,
        }
    }

    pub async fn from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
        let catalog = Catalog::open(&cfg.database.path)
            .await
            .context("open catalog")?;
        let filter = FileFilter::from_config(&cfg.scan)?;
        Ok(Self::new(
            catalog,
            cfg.scan.dir.clone(),
            filter,
            Previewer::from_config(&cfg.preview),
        ))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn scan_dir(&self) -> &Path {
        &self.scan_dir
    }

    pub fn filter(&self) -> &FileFilter {
        &self.filter
    }

    pub async fn pending_files(&self) -> Result<Vec<String>, ImportError> {
        importer::pending_files(&self.scan_dir, &self.filter, &self.catalog).await
    }

    pub async fn import(&self) -> Result<ImportSummary, ImportError> {
        importer::import_new_files(&self.scan_dir, &self.filter, &self.catalog).await
    }

    pub async fn browse(&self, query: &DocumentQuery) -> CatalogResult<Vec<Document>> {
        self.catalog.search(query).await
    }

    pub async fn document(&self, filename: &str) -> CatalogResult<Document> {
        self.catalog.document(filename).await
    }

    pub async fn tags(&self) -> CatalogResult<Vec<TagSummary>> {
        self.catalog.tag_summaries().await
    }

    /// Apply every name in `names`. All names are validated before any is written.
    pub async fn add_tags(&self, filename: &str, names: &[String]) -> CatalogResult<Document> {
        let document = self.catalog.document(filename).await?;
        for name in names {
            normalize_tag_name(name)?;
        }
        for name in names {
            let (tag, _) = self.catalog.get_or_create_tag(name).await?;
            self.catalog.add_tag(&document, &tag).await?;
        }
        info!(filename, tags = ?names, "tags added");
        self.catalog.document(filename).await
    }

    pub async fn remove_tags(&self, filename: &str, names: &[String]) -> CatalogResult<Document> {
        let document = self.catalog.document(filename).await?;
        for name in names {
            self.catalog.remove_tag(&document, name).await?;
        }
        info!(filename, tags = ?names, "tags removed");
        self.catalog.document(filename).await
    }

    pub async fn set_tags(&self, filename: &str, names: &[String]) -> CatalogResult<Document> {
        let document = self.catalog.document(filename).await?;
        let document = self.catalog.set_tags(&document, names).await?;
        info!(filename, tags = ?document.tags, "tags replaced");
        Ok(document)
    }

    /// Launch the previewer for a cataloged file. Never touches the catalog
    /// beyond the lookup.
    pub async fn quicklook(&self, filename: &str) -> anyhow::Result<PathBuf> {
        let document = self.catalog.document(filename).await?;
        let path = self
            .previewer
            .quicklook(&self.scan_dir, &document.filename)
            .with_context(|| {
                format!(
                    "preview {} with {}",
                    document.filename,
                    self.previewer.program()
                )
            })?;
        Ok(path)
    }
}

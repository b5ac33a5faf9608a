use crate::error::{CatalogError, CatalogResult};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub filename: String,
    pub created_at: i64,
    pub updated_at: i64,
    /// Names of the applied tags, sorted.
    pub tags: Vec<String>,
}

impl Document {
    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t == name)
    }

    pub fn is_untagged(&self) -> bool {
        self.tags.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TagSummary {
    pub name: String,
    pub documents: i64,
}

/// Row shape shared by every document query; `tags` is a space separated
/// GROUP_CONCAT, which is safe because tag names never contain whitespace.
#[derive(Debug, FromRow)]
pub(crate) struct DocumentRow {
    pub id: i64,
    pub filename: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub tags: Option<String>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        let mut tags: Vec<String> = row
            .tags
            .map(|s| s.split_whitespace().map(String::from).collect())
            .unwrap_or_default();
        tags.sort();
        Document {
            id: row.id,
            filename: row.filename,
            created_at: row.created_at,
            updated_at: row.updated_at,
            tags,
        }
    }
}

/// Filter used when browsing the catalog.
///
/// All tag names must be present on a document (AND). An empty tag set
/// matches everything. `text` is a case-insensitive filename substring.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentQuery {
    pub tags: BTreeSet<String>,
    pub text: Option<String>,
    pub untagged_only: bool,
}

impl DocumentQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            tags: normalize_filter_tags(tags),
            ..Self::default()
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        let trimmed = text.trim();
        self.text = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self
    }

    pub fn untagged(mut self, untagged_only: bool) -> Self {
        self.untagged_only = untagged_only;
        self
    }

    pub fn is_unfiltered(&self) -> bool {
        self.tags.is_empty() && self.text.is_none() && !self.untagged_only
    }
}

pub(crate) fn normalize_filter_tags<I, S>(tags: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .map(|t| t.as_ref().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Trim a tag name and reject empty names or names with inner whitespace.
pub fn normalize_tag_name(raw: &str) -> CatalogResult<&str> {
    let name = raw.trim();
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(CatalogError::InvalidTagName {
            name: raw.to_string(),
        });
    }
    Ok(name)
}

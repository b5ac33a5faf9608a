//! Document/tag catalog on top of the SQLite pool.

use crate::error::{CatalogError, CatalogResult, Entity};
use crate::models::{normalize_tag_name, Document, DocumentQuery, DocumentRow, Tag, TagSummary};
use crate::{connect, migrate};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

const NOW: &str = "CAST(strftime('%s','now') AS INTEGER)";

const DOCUMENT_SELECT: &str = r#"
    SELECT d.id, d.filename, d.created_at, d.updated_at,
        (SELECT GROUP_CONCAT(t.name, ' ')
         FROM document_tags dt JOIN tags t ON t.id = dt.tag_id
         WHERE dt.document_id = d.id) AS tags
    FROM documents d
"#;

#[derive(Clone)]
pub struct Catalog {
    pool: SqlitePool,
}

impl Catalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to `database` (path or `sqlite:` URL) and bring the schema up to date.
    pub async fn open(database: &str) -> anyhow::Result<Self> {
        let pool = connect(database).await?;
        migrate(&pool).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn create_document(&self, filename: &str) -> CatalogResult<Document> {
        let sql = format!(
            "INSERT INTO documents (filename, created_at, updated_at) VALUES (?1, {NOW}, {NOW})"
        );
        match sqlx::query(&sql).bind(filename).execute(&self.pool).await {
            Ok(_) => {}
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(CatalogError::Duplicate {
                    entity: Entity::Document,
                    key: filename.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        }
        debug!(filename, "document created");
        self.document(filename).await
    }

    pub async fn document(&self, filename: &str) -> CatalogResult<Document> {
        let sql = format!("{DOCUMENT_SELECT} WHERE d.filename = ?1");
        sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(filename)
            .fetch_optional(&self.pool)
            .await?
            .map(Document::from)
            .ok_or_else(|| CatalogError::NotFound {
                entity: Entity::Document,
                key: filename.to_string(),
            })
    }

    pub async fn document_count(&self) -> CatalogResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM documents")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn filenames(&self) -> CatalogResult<HashSet<String>> {
        let names = sqlx::query_scalar::<_, String>("SELECT filename FROM documents")
            .fetch_all(&self.pool)
            .await?;
        Ok(names.into_iter().collect())
    }

    /// Returns the tag named `name` (trimmed), creating it when absent.
    /// The flag is true when this call created it.
    pub async fn get_or_create_tag(&self, name: &str) -> CatalogResult<(Tag, bool)> {
        let name = normalize_tag_name(name)?;
        let created = sqlx::query("INSERT OR IGNORE INTO tags (name) VALUES (?1)")
            .bind(name)
            .execute(&self.pool)
            .await?
            .rows_affected()
            > 0;
        if created {
            debug!(tag = name, "tag created");
        }
        Ok((self.tag(name).await?, created))
    }

    pub async fn tag(&self, name: &str) -> CatalogResult<Tag> {
        sqlx::query_as::<_, Tag>("SELECT id, name FROM tags WHERE name = ?1")
            .bind(name.trim())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| CatalogError::NotFound {
                entity: Entity::Tag,
                key: name.trim().to_string(),
            })
    }

    /// Associate `tag` with `document`. Returns false when it already was.
    pub async fn add_tag(&self, document: &Document, tag: &Tag) -> CatalogResult<bool> {
        let added = sqlx::query(
            "INSERT OR IGNORE INTO document_tags (document_id, tag_id) VALUES (?1, ?2)",
        )
        .bind(document.id)
        .bind(tag.id)
        .execute(&self.pool)
        .await?
        .rows_affected()
            > 0;
        if added {
            self.touch(document.id).await?;
            debug!(filename = %document.filename, tag = %tag.name, "tag added");
        }
        Ok(added)
    }

    /// Drop the association by tag name. Missing tags are not an error.
    pub async fn remove_tag(&self, document: &Document, tag_name: &str) -> CatalogResult<bool> {
        let removed = sqlx::query(
            "DELETE FROM document_tags WHERE document_id = ?1 AND tag_id IN (SELECT id FROM tags WHERE name = ?2)",
        )
        .bind(document.id)
        .bind(tag_name.trim())
        .execute(&self.pool)
        .await?
        .rows_affected()
            > 0;
        if removed {
            self.touch(document.id).await?;
            debug!(filename = %document.filename, tag = tag_name.trim(), "tag removed");
        }
        Ok(removed)
    }

    /// Resolve the document by filename, then get-or-create and apply the tag.
    /// Returns the tag and whether the association is new.
    pub async fn apply_tag(&self, filename: &str, name: &str) -> CatalogResult<(Tag, bool)> {
        let document = self.document(filename).await?;
        let (tag, _) = self.get_or_create_tag(name).await?;
        let added = self.add_tag(&document, &tag).await?;
        Ok((tag, added))
    }

    pub async fn tags_for(&self, document: &Document) -> CatalogResult<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>(
            "SELECT t.id, t.name FROM tags t JOIN document_tags dt ON dt.tag_id = t.id WHERE dt.document_id = ?1 ORDER BY t.name",
        )
        .bind(document.id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tags)
    }

    /// Replace the document's tag set. Names are validated before anything
    /// is written; the replacement happens in one transaction.
    pub async fn set_tags<I, S>(&self, document: &Document, names: I) -> CatalogResult<Document>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut wanted = BTreeSet::new();
        for name in names {
            wanted.insert(normalize_tag_name(name.as_ref())?.to_string());
        }
        let current: BTreeSet<String> = self
            .tags_for(document)
            .await?
            .into_iter()
            .map(|t| t.name)
            .collect();
        if current == wanted {
            return self.document(&document.filename).await;
        }

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM document_tags WHERE document_id = ?1")
            .bind(document.id)
            .execute(&mut *tx)
            .await?;
        for name in &wanted {
            sqlx::query("INSERT OR IGNORE INTO tags (name) VALUES (?1)")
                .bind(name.as_str())
                .execute(&mut *tx)
                .await?;
            sqlx::query(
                "INSERT OR IGNORE INTO document_tags (document_id, tag_id) SELECT ?1, id FROM tags WHERE name = ?2",
            )
            .bind(document.id)
            .bind(name.as_str())
            .execute(&mut *tx)
            .await?;
        }
        let touch = format!("UPDATE documents SET updated_at = {NOW} WHERE id = ?1");
        sqlx::query(&touch)
            .bind(document.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        debug!(filename = %document.filename, tags = ?wanted, "tags replaced");
        self.document(&document.filename).await
    }

    /// Documents carrying every name in `tag_names`; all documents when empty.
    pub async fn documents_by_tags<I, S>(&self, tag_names: I) -> CatalogResult<Vec<Document>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.search(&DocumentQuery::with_tags(tag_names)).await
    }

    pub async fn search(&self, query: &DocumentQuery) -> CatalogResult<Vec<Document>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(DOCUMENT_SELECT);
        qb.push(" WHERE 1 = 1");

        if !query.tags.is_empty() {
            qb.push(
                " AND d.id IN (SELECT dt.document_id FROM document_tags dt \
                 JOIN tags t ON t.id = dt.tag_id WHERE t.name IN (",
            );
            {
                let mut names = qb.separated(", ");
                for name in &query.tags {
                    names.push_bind(name.clone());
                }
            }
            qb.push(") GROUP BY dt.document_id HAVING COUNT(DISTINCT dt.tag_id) = ");
            qb.push_bind(query.tags.len() as i64);
            qb.push(")");
        }

        if let Some(text) = &query.text {
            qb.push(" AND instr(lower(d.filename), lower(");
            qb.push_bind(text.clone());
            qb.push(")) > 0");
        }

        if query.untagged_only {
            qb.push(" AND NOT EXISTS (SELECT 1 FROM document_tags dt WHERE dt.document_id = d.id)");
        }

        qb.push(" ORDER BY d.id");

        let rows = qb
            .build_query_as::<DocumentRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Document::from).collect())
    }

    pub async fn all_tags(&self) -> CatalogResult<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>("SELECT id, name FROM tags ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(tags)
    }

    pub async fn tag_summaries(&self) -> CatalogResult<Vec<TagSummary>> {
        let tags = sqlx::query_as::<_, TagSummary>(
            r#"
            SELECT t.name AS name, COUNT(dt.document_id) AS documents
            FROM tags t
            LEFT JOIN document_tags dt ON dt.tag_id = t.id
            GROUP BY t.id
            ORDER BY t.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(tags)
    }

    async fn touch(&self, document_id: i64) -> CatalogResult<()> {
        let sql = format!("UPDATE documents SET updated_at = {NOW} WHERE id = ?1");
        sqlx::query(&sql)
            .bind(document_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

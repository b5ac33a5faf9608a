use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Document,
    Tag,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Document => f.write_str("document"),
            Entity::Tag => f.write_str("tag"),
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{entity} \"{key}\" already exists")]
    Duplicate { entity: Entity, key: String },
    #[error("{entity} \"{key}\" not found")]
    NotFound { entity: Entity, key: String },
    #[error("invalid tag name {name:?}: tags are single non-empty words")]
    InvalidTagName { name: String },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl CatalogError {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, CatalogError::Duplicate { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound { .. })
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;

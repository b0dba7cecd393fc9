use async_trait::async_trait;
use serde_json::Value;

use crate::{
    error::{BackendError, SourceError},
    model::film::{Candidate, Film},
};

pub mod letterboxd_client;
pub mod supabase_client;

/// Where film pages and search results come from.
#[async_trait]
pub trait FilmSource: Send + Sync {
    /// Fetches the film page for `slug`. Fails if the slug does not name a film.
    async fn lookup(&self, slug: &str) -> Result<Film, SourceError>;

    /// Free-text film search, ranked by the site, at most `max_results` long.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Candidate>, SourceError>;
}

/// Row filter understood by [`Backend`] implementations.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, String),
    IsNull(String),
    NotNull(String),
    /// Case-insensitive substring match.
    ILike(String, String),
    Limit(usize),
}

impl Filter {
    pub fn eq(column: &str, value: impl ToString) -> Filter {
        Filter::Eq(column.to_string(), value.to_string())
    }

    pub fn is_null(column: &str) -> Filter {
        Filter::IsNull(column.to_string())
    }

    pub fn not_null(column: &str) -> Filter {
        Filter::NotNull(column.to_string())
    }

    pub fn ilike(column: &str, pattern: &str) -> Filter {
        Filter::ILike(column.to_string(), pattern.to_string())
    }
}

/// A table-oriented store. Writes return the affected rows.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn select(
        &self,
        table: &str,
        columns: &str,
        filters: &[Filter],
    ) -> Result<Vec<Value>, BackendError>;

    async fn update(
        &self,
        table: &str,
        filters: &[Filter],
        fields: Value,
    ) -> Result<Vec<Value>, BackendError>;

    async fn insert(&self, table: &str, fields: Value) -> Result<Vec<Value>, BackendError>;
}

use std::sync::Arc;

use serde_json::json;

use crate::{
    clients::{Backend, Filter},
    error::WriteError,
    model::{
        rating::Rating,
        record::{RecordKey, DRAFT_PICKS_TABLE, RATING_COLUMN, TITLE_COLUMN, YEAR_COLUMN},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Updated {
    pub rows: usize,
}

/// Persists fetched ratings. One attempt per call; the caller counts failures.
pub struct ReconciliationWriter {
    backend: Arc<dyn Backend>,
}

impl ReconciliationWriter {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        ReconciliationWriter { backend }
    }

    pub async fn write_rating(
        &self,
        key: &RecordKey,
        rating: Rating,
    ) -> Result<Updated, WriteError> {
        let id = match key {
            RecordKey::Id(id) => id.clone(),
            RecordKey::TitleYear { title, year } => self.find_record_id(key, title, *year).await?,
        };

        let rows = self
            .backend
            .update(
                DRAFT_PICKS_TABLE,
                &[Filter::eq("id", &id)],
                json!({ RATING_COLUMN: rating.value() }),
            )
            .await?;

        if rows.is_empty() {
            return Err(WriteError::NoRowsAffected(id));
        }

        Ok(Updated { rows: rows.len() })
    }

    async fn find_record_id(
        &self,
        key: &RecordKey,
        title: &str,
        year: Option<i32>,
    ) -> Result<String, WriteError> {
        let mut filters = vec![Filter::ilike(TITLE_COLUMN, title)];
        if let Some(year) = year {
            filters.push(Filter::eq(YEAR_COLUMN, year));
        }
        filters.push(Filter::Limit(1));

        let rows = self
            .backend
            .select(DRAFT_PICKS_TABLE, "id", &filters)
            .await?;

        rows.first()
            .and_then(|row| row["id"].as_str())
            .map(|id| id.to_string())
            .ok_or_else(|| WriteError::RecordNotFound(key.to_string()))
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

pub const DRAFT_PICKS_TABLE: &str = "draft_picks";
pub const TARGET_RECORD_COLUMNS: &str = "id,movie_id,movie_title,movie_year,letterboxd_rating";
pub const RATING_COLUMN: &str = "letterboxd_rating";
pub const TITLE_COLUMN: &str = "movie_title";
pub const YEAR_COLUMN: &str = "movie_year";

/// A `draft_picks` row eligible for rating enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetRecord {
    pub id: String,
    #[serde(rename = "movie_title")]
    pub title: String,
    #[serde(rename = "movie_year", default)]
    pub year: Option<i32>,
    #[serde(rename = "movie_id", default)]
    pub tmdb_id: Option<u64>,
    #[serde(rename = "letterboxd_rating", default)]
    pub rating: Option<f64>,
}

impl TargetRecord {
    pub fn key(&self) -> RecordKey {
        RecordKey::Id(self.id.clone())
    }
}

impl fmt::Display for TargetRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.year {
            Some(year) => write!(f, "{} ({})", self.title, year),
            None => write!(f, "{}", self.title),
        }
    }
}

/// How the writer locates the row to update.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordKey {
    Id(String),
    /// First row whose title contains `title` (case-insensitive) and whose year matches.
    TitleYear { title: String, year: Option<i32> },
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKey::Id(id) => write!(f, "id={}", id),
            RecordKey::TitleYear {
                title,
                year: Some(year),
            } => write!(f, "'{}' ({})", title, year),
            RecordKey::TitleYear { title, year: None } => write!(f, "'{}'", title),
        }
    }
}

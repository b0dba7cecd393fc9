use serde::Serialize;

use crate::slug;

pub const LETTERBOXD_BASE_URL: &str = "https://letterboxd.com";

/// A film page as extracted from Letterboxd.
///
/// Every field but `slug` and `title` may be missing from a page. The three
/// raw rating fields are kept as found, in the priority order they are read
/// by the rating fetcher.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Film {
    pub slug: String,
    pub title: String,
    pub year: Option<i32>,
    pub genres: Vec<String>,
    pub director: Option<String>,
    pub tmdb_link: Option<String>,
    pub rating: Option<String>,
    pub average_rating: Option<String>,
    pub avg_rating: Option<String>,
}

impl Film {
    pub fn tmdb_id(&self) -> Option<u64> {
        self.tmdb_link
            .as_deref()
            .and_then(slug::extract_tmdb_id_from_url)
    }

    /// True when both ids are known and differ.
    pub fn contradicts_tmdb_id(&self, expected: Option<u64>) -> bool {
        matches!(
            (expected, self.tmdb_id()),
            (Some(expected), Some(actual)) if expected != actual
        )
    }

    /// First rating-like field present, in fixed priority order.
    pub fn raw_rating(&self) -> Option<&str> {
        self.rating
            .as_deref()
            .or(self.average_rating.as_deref())
            .or(self.avg_rating.as_deref())
    }
}

/// One search result considered while resolving a title.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub title: String,
    pub year: Option<i32>,
    pub slug: Option<String>,
}

/// One film on a list or watchlist grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PosterFilm {
    pub slug: String,
    pub title: String,
    pub year: Option<i32>,
}

impl PosterFilm {
    pub fn letterboxd_uri(&self) -> String {
        format!("{}/film/{}/", LETTERBOXD_BASE_URL, self.slug)
    }

    pub fn to_csvable_array(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            self.year.map(|y| y.to_string()).unwrap_or_default(),
            self.letterboxd_uri(),
        ]
    }

    pub fn csv_titles() -> Vec<&'static str> {
        vec!["Title", "Year", "LetterboxdURI"]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilmList {
    pub title: String,
    pub films: Vec<PosterFilm>,
}

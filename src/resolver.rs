use std::{fmt, sync::Arc};

use crate::{clients::FilmSource, model::film::Candidate, slug};

pub const MAX_SEARCH_RESULTS: usize = 5;

/// How a title was matched to a Letterboxd slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The guessed slug named a film.
    Direct(String),
    /// A search result matched the title (and year, when given).
    Matched(String),
    /// No search result matched; the first one was taken.
    Approximate(String),
    NotFound,
}

impl Resolution {
    pub fn slug(&self) -> Option<&str> {
        match self {
            Resolution::Direct(slug)
            | Resolution::Matched(slug)
            | Resolution::Approximate(slug) => Some(slug.as_str()),
            Resolution::NotFound => None,
        }
    }

    pub fn into_slug(self) -> Option<String> {
        match self {
            Resolution::Direct(slug)
            | Resolution::Matched(slug)
            | Resolution::Approximate(slug) => Some(slug),
            Resolution::NotFound => None,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Direct(slug) => write!(f, "{} (direct)", slug),
            Resolution::Matched(slug) => write!(f, "{} (search match)", slug),
            Resolution::Approximate(slug) => {
                write!(f, "{} (first search result, may not be exact)", slug)
            }
            Resolution::NotFound => write!(f, "not found"),
        }
    }
}

pub struct IdentifierResolver {
    source: Arc<dyn FilmSource>,
}

impl IdentifierResolver {
    pub fn new(source: Arc<dyn FilmSource>) -> Self {
        IdentifierResolver { source }
    }

    /// Finds the Letterboxd slug for a title. Never fails: lookup and search
    /// errors are logged and end in [`Resolution::NotFound`].
    pub async fn resolve(&self, title: &str, year: Option<i32>) -> Resolution {
        self.resolve_with_tmdb_id(title, year, None).await
    }

    /// Like [`resolve`](Self::resolve), but a guessed slug whose film carries a
    /// different TMDB id is not taken; the title is searched instead and the
    /// rejected slug is left out of the candidates.
    pub async fn resolve_with_tmdb_id(
        &self,
        title: &str,
        year: Option<i32>,
        tmdb_id: Option<u64>,
    ) -> Resolution {
        let guess = slug::guess_slug(title);
        let mut rejected = None;

        if !guess.is_empty() {
            match self.source.lookup(&guess).await {
                Ok(film) if film.contradicts_tmdb_id(tmdb_id) => {
                    log::info!(
                        "Slug {} has TMDB id {:?}, expected {:?}; searching instead",
                        guess,
                        film.tmdb_id(),
                        tmdb_id
                    );
                    rejected = Some(guess);
                }
                Ok(_) => {
                    log::info!("Found movie by slug: {}", guess);
                    return Resolution::Direct(guess);
                }
                Err(e) => log::debug!("Slug {} did not resolve, searching instead: {}", guess, e),
            }
        }

        let query = match year {
            Some(year) => format!("{} {}", title, year),
            None => title.to_string(),
        };

        match self.source.search(&query, MAX_SEARCH_RESULTS).await {
            Ok(mut candidates) => {
                if let Some(rejected) = rejected {
                    candidates.retain(|c| c.slug.as_deref() != Some(rejected.as_str()));
                }
                Self::choose_candidate(title, year, candidates)
            }
            Err(e) => {
                log::warn!("Search failed for {}: {}", title, e);
                Resolution::NotFound
            }
        }
    }

    /// First exact title (and year) match in search order, else the first candidate.
    pub fn choose_candidate(
        title: &str,
        year: Option<i32>,
        candidates: Vec<Candidate>,
    ) -> Resolution {
        if candidates.is_empty() {
            log::warn!("No Letterboxd results found for: {}", title);
            return Resolution::NotFound;
        }

        let wanted_title = title.to_lowercase();
        let exact_match = candidates.iter().position(|candidate| {
            candidate.title.to_lowercase() == wanted_title
                && year.map_or(true, |year| candidate.year == Some(year))
        });

        let approximate = exact_match.is_none();
        if approximate {
            log::warn!(
                "Using first search result for: {} (may not be exact match)",
                title
            );
        }

        let chosen = candidates.into_iter().nth(exact_match.unwrap_or(0));
        match chosen.and_then(|candidate| candidate.slug) {
            Some(slug) if approximate => Resolution::Approximate(slug),
            Some(slug) => Resolution::Matched(slug),
            None => {
                log::warn!("No slug found for: {}", title);
                Resolution::NotFound
            }
        }
    }
}

use std::{fmt, sync::Arc};

use serde_json::json;

use crate::{
    clients::{Backend, FilmSource, Filter},
    error::{BackendError, SyncError},
    model::{
        film::{Film, PosterFilm},
        tally::SyncTally,
    },
    progress::ProgressSink,
};

pub const SPEC_DRAFT_MOVIES_TABLE: &str = "spec_draft_movies";

#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    Synced { tmdb_id: u64 },
    /// Dry run: the film would have been inserted.
    WouldSync { tmdb_id: u64 },
    Skipped(String),
    Errored(String),
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncOutcome::Synced { tmdb_id } => {
                write!(f, "added to spec draft (TMDB ID: {})", tmdb_id)
            }
            SyncOutcome::WouldSync { tmdb_id } => {
                write!(f, "would be added (TMDB ID: {})", tmdb_id)
            }
            SyncOutcome::Skipped(reason) => write!(f, "skipped: {}", reason),
            SyncOutcome::Errored(reason) => write!(f, "error: {}", reason),
        }
    }
}

/// Copies Letterboxd films into a spec draft's `spec_draft_movies` rows.
pub struct SpecDraftSync {
    source: Arc<dyn FilmSource>,
    backend: Arc<dyn Backend>,
    sink: Arc<dyn ProgressSink>,
}

impl SpecDraftSync {
    pub fn new(
        source: Arc<dyn FilmSource>,
        backend: Arc<dyn Backend>,
        sink: Arc<dyn ProgressSink>,
    ) -> Self {
        SpecDraftSync {
            source,
            backend,
            sink,
        }
    }

    pub async fn sync_films(
        &self,
        films: &[PosterFilm],
        spec_draft_id: &str,
        dry_run: bool,
    ) -> Result<SyncTally, SyncError> {
        let mut tally = SyncTally::default();

        for film in films {
            let outcome = match self.sync_film(film, spec_draft_id, dry_run).await {
                Ok(outcome) => outcome,
                Err(source) if source.is_unavailable() => {
                    tally.errored += 1;
                    return Err(SyncError::BackendUnavailable { tally, source });
                }
                Err(e) => SyncOutcome::Errored(e.to_string()),
            };

            match outcome {
                SyncOutcome::Synced { .. } | SyncOutcome::WouldSync { .. } => tally.synced += 1,
                SyncOutcome::Skipped(_) => tally.skipped += 1,
                SyncOutcome::Errored(_) => tally.errored += 1,
            }
            self.sink.film_synced(film, &outcome);
        }

        self.sink.sync_finished(&tally, dry_run);
        Ok(tally)
    }

    async fn sync_film(
        &self,
        film: &PosterFilm,
        spec_draft_id: &str,
        dry_run: bool,
    ) -> Result<SyncOutcome, BackendError> {
        let details = match self.source.lookup(&film.slug).await {
            Ok(details) => Some(details),
            Err(e) => {
                log::warn!(
                    "Error matching Letterboxd film {} to TMDB: {}",
                    film.slug,
                    e
                );
                None
            }
        };

        let tmdb_id = match details.as_ref().and_then(Film::tmdb_id) {
            Some(tmdb_id) => tmdb_id,
            None => return Ok(SyncOutcome::Skipped("no TMDB ID found".to_string())),
        };

        if dry_run {
            return Ok(SyncOutcome::WouldSync { tmdb_id });
        }

        let existing = self
            .backend
            .select(
                SPEC_DRAFT_MOVIES_TABLE,
                "id",
                &[
                    Filter::eq("spec_draft_id", spec_draft_id),
                    Filter::eq("movie_tmdb_id", tmdb_id),
                ],
            )
            .await?;
        if !existing.is_empty() {
            return Ok(SyncOutcome::Skipped("already in spec draft".to_string()));
        }

        let title = details
            .as_ref()
            .map(|d| d.title.clone())
            .unwrap_or_else(|| film.title.clone());
        let year = details.as_ref().and_then(|d| d.year).or(film.year);

        let inserted = self
            .backend
            .insert(
                SPEC_DRAFT_MOVIES_TABLE,
                json!({
                    "spec_draft_id": spec_draft_id,
                    "movie_tmdb_id": tmdb_id,
                    "movie_title": title,
                    "movie_year": year,
                }),
            )
            .await?;

        if inserted.is_empty() {
            return Ok(SyncOutcome::Errored(format!("failed to add {}", title)));
        }

        Ok(SyncOutcome::Synced { tmdb_id })
    }
}

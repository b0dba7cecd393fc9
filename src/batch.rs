use std::{sync::Arc, time::Duration};

use crate::{
    clients::{Backend, FilmSource, Filter},
    error::{BackendError, BatchError, FetchError, WriteError},
    model::{
        record::{
            TargetRecord, DRAFT_PICKS_TABLE, RATING_COLUMN, TARGET_RECORD_COLUMNS, TITLE_COLUMN,
        },
        tally::Tally,
    },
    progress::{ProgressSink, RecordState},
    rating_fetcher::RatingFetcher,
    resolver::IdentifierResolver,
    writer::ReconciliationWriter,
};

pub const DEFAULT_LIMIT: usize = 100;

/// Pause between two records, to stay polite with Letterboxd.
pub const REQUEST_DELAY: Duration = Duration::from_secs(2);

/// Fills in missing Letterboxd ratings, one record at a time.
pub struct BatchDriver {
    backend: Arc<dyn Backend>,
    resolver: IdentifierResolver,
    fetcher: RatingFetcher,
    writer: ReconciliationWriter,
    sink: Arc<dyn ProgressSink>,
    delay: Duration,
}

impl BatchDriver {
    pub fn new(
        source: Arc<dyn FilmSource>,
        backend: Arc<dyn Backend>,
        sink: Arc<dyn ProgressSink>,
    ) -> Self {
        BatchDriver {
            resolver: IdentifierResolver::new(source.clone()),
            fetcher: RatingFetcher::new(source),
            writer: ReconciliationWriter::new(backend.clone()),
            backend,
            sink,
            delay: REQUEST_DELAY,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Records with no rating yet and a title, in whatever order the backend returns them.
    pub async fn pending_records(
        &self,
        max_records: usize,
    ) -> Result<Vec<TargetRecord>, BackendError> {
        let rows = self
            .backend
            .select(
                DRAFT_PICKS_TABLE,
                TARGET_RECORD_COLUMNS,
                &[
                    Filter::is_null(RATING_COLUMN),
                    Filter::not_null(TITLE_COLUMN),
                    Filter::Limit(max_records),
                ],
            )
            .await?;

        rows.into_iter()
            .map(|row| {
                serde_json::from_value::<TargetRecord>(row).map_err(|e| BackendError::Decode {
                    table: DRAFT_PICKS_TABLE.to_string(),
                    message: e.to_string(),
                })
            })
            .collect()
    }

    pub async fn run_batch(&self, max_records: usize, dry_run: bool) -> Result<Tally, BatchError> {
        log::info!(
            "Fetching movies missing Letterboxd ratings (limit: {})",
            max_records
        );
        let records = self
            .pending_records(max_records)
            .await
            .map_err(BatchError::Query)?;

        let total = records.len();
        self.sink.batch_started(total);

        let mut tally = Tally::default();
        for (index, record) in records.iter().enumerate() {
            let position = index + 1;

            if dry_run {
                let resolution = self
                    .resolver
                    .resolve_with_tmdb_id(&record.title, record.year, record.tmdb_id)
                    .await;
                self.sink.dry_run_match(record, &resolution);
                tally.total += 1;
                if resolution.slug().is_none() {
                    tally.skipped += 1;
                }
            } else {
                let outcome = self.process_record(position, total, record).await;
                tally.total += 1;
                match outcome {
                    Ok(RecordState::Updated(_)) => tally.updated += 1,
                    Ok(RecordState::Skipped(_)) => tally.skipped += 1,
                    Ok(_) => tally.errored += 1,
                    Err(source) => {
                        tally.errored += 1;
                        let state = RecordState::Errored(source.to_string());
                        self.sink.record_state(position, total, record, &state);
                        return Err(BatchError::BackendUnavailable { tally, source });
                    }
                }
            }

            if position < total {
                tokio::time::sleep(self.delay).await;
            }
        }

        self.sink.batch_finished(&tally, dry_run);
        Ok(tally)
    }

    /// Runs one record to a terminal state. Only an unavailable backend is an `Err`.
    async fn process_record(
        &self,
        position: usize,
        total: usize,
        record: &TargetRecord,
    ) -> Result<RecordState, BackendError> {
        let report = |state: &RecordState| self.sink.record_state(position, total, record, state);

        report(&RecordState::Pending);
        report(&RecordState::Resolving);
        let resolution = self
            .resolver
            .resolve_with_tmdb_id(&record.title, record.year, record.tmdb_id)
            .await;
        let slug = match resolution.into_slug() {
            Some(slug) => slug,
            None => {
                let state = RecordState::Skipped("no Letterboxd match".to_string());
                report(&state);
                return Ok(state);
            }
        };

        report(&RecordState::Fetching);
        let state = match self.fetcher.fetch_rated_film(&slug).await {
            Ok((film, _)) if film.contradicts_tmdb_id(record.tmdb_id) => {
                RecordState::Skipped(format!(
                    "{} has TMDB id {:?}, record expects {:?}",
                    slug,
                    film.tmdb_id(),
                    record.tmdb_id
                ))
            }
            Ok((_, rating)) => {
                report(&RecordState::Writing);
                match self.writer.write_rating(&record.key(), rating).await {
                    Ok(_) => RecordState::Updated(rating),
                    Err(WriteError::Backend(e)) if e.is_unavailable() => return Err(e),
                    Err(e) => RecordState::Errored(e.to_string()),
                }
            }
            Err(e @ FetchError::NotFound(_)) | Err(e @ FetchError::OutOfRange(_)) => {
                RecordState::Skipped(e.to_string())
            }
            Err(e @ FetchError::Source(_)) => RecordState::Errored(e.to_string()),
        };

        report(&state);
        Ok(state)
    }
}

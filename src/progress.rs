use std::fmt;

use crate::{
    model::{
        film::PosterFilm,
        rating::Rating,
        record::TargetRecord,
        tally::{SyncTally, Tally},
    },
    resolver::Resolution,
    sync::SyncOutcome,
};

/// Where a record is in the batch pipeline. The last three are terminal.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordState {
    Pending,
    Resolving,
    Fetching,
    Writing,
    Updated(Rating),
    Skipped(String),
    Errored(String),
}

impl RecordState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RecordState::Updated(_) | RecordState::Skipped(_) | RecordState::Errored(_)
        )
    }
}

impl fmt::Display for RecordState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordState::Pending => write!(f, "pending"),
            RecordState::Resolving => write!(f, "resolving"),
            RecordState::Fetching => write!(f, "fetching"),
            RecordState::Writing => write!(f, "writing"),
            RecordState::Updated(rating) => write!(f, "updated: {}", rating),
            RecordState::Skipped(reason) => write!(f, "skipped: {}", reason),
            RecordState::Errored(reason) => write!(f, "error: {}", reason),
        }
    }
}

/// Observer for batch and sync progress. Every method defaults to doing nothing.
pub trait ProgressSink: Send + Sync {
    fn batch_started(&self, _total: usize) {}

    fn record_state(
        &self,
        _position: usize,
        _total: usize,
        _record: &TargetRecord,
        _state: &RecordState,
    ) {
    }

    fn dry_run_match(&self, _record: &TargetRecord, _resolution: &Resolution) {}

    fn batch_finished(&self, _tally: &Tally, _dry_run: bool) {}

    fn film_synced(&self, _film: &PosterFilm, _outcome: &SyncOutcome) {}

    fn sync_finished(&self, _tally: &SyncTally, _dry_run: bool) {}
}

/// Discards all progress.
pub struct SilentSink;

impl ProgressSink for SilentSink {}

/// Reports progress through the `log` facade.
pub struct LogSink;

impl ProgressSink for LogSink {
    fn batch_started(&self, total: usize) {
        if total == 0 {
            log::info!("No movies need Letterboxd ratings");
        } else {
            log::info!("Found {} movies to process", total);
        }
    }

    fn record_state(
        &self,
        position: usize,
        total: usize,
        record: &TargetRecord,
        state: &RecordState,
    ) {
        match state {
            RecordState::Pending => log::info!("[{}/{}] Processing: {}", position, total, record),
            RecordState::Updated(_) => log::info!("[{}/{}] {} {}", position, total, record, state),
            RecordState::Skipped(_) => log::warn!("[{}/{}] {} {}", position, total, record, state),
            RecordState::Errored(_) => log::error!("[{}/{}] {} {}", position, total, record, state),
            _ => log::debug!("[{}/{}] {} {}", position, total, record, state),
        }
    }

    fn dry_run_match(&self, record: &TargetRecord, resolution: &Resolution) {
        log::info!("Would fetch rating for {}: {}", record, resolution);
    }

    fn batch_finished(&self, tally: &Tally, dry_run: bool) {
        if dry_run {
            log::info!("Dry run finished, nothing was written. {}", tally);
        } else {
            log::info!("Summary: {}", tally);
        }
    }

    fn film_synced(&self, film: &PosterFilm, outcome: &SyncOutcome) {
        match outcome {
            SyncOutcome::Skipped(_) => log::warn!("{} ({:?}): {}", film.title, film.year, outcome),
            SyncOutcome::Errored(_) => log::error!("{} ({:?}): {}", film.title, film.year, outcome),
            _ => log::info!("{} ({:?}): {}", film.title, film.year, outcome),
        }
    }

    fn sync_finished(&self, tally: &SyncTally, dry_run: bool) {
        log::info!("Summary: {}", tally);
        if dry_run {
            log::info!("Run without --dry-run to actually sync the data");
        }
    }
}

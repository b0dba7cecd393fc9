#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use letterboxd2supabase::{
    clients::{Backend, FilmSource, Filter},
    error::{BackendError, SourceError},
    model::{
        film::{Candidate, Film, PosterFilm},
        record::TargetRecord,
        tally::{SyncTally, Tally},
    },
    progress::{ProgressSink, RecordState},
    resolver::Resolution,
    sync::SyncOutcome,
};
use serde_json::{json, Value};

pub fn film(slug: &str, title: &str, year: Option<i32>, rating: Option<&str>) -> Film {
    Film {
        slug: slug.to_string(),
        title: title.to_string(),
        year,
        rating: rating.map(|r| r.to_string()),
        ..Default::default()
    }
}

pub fn with_tmdb(film: Film, tmdb_id: u64) -> Film {
    Film {
        tmdb_link: Some(format!("https://www.themoviedb.org/movie/{}/", tmdb_id)),
        ..film
    }
}

pub fn candidate(title: &str, year: Option<i32>, slug: Option<&str>) -> Candidate {
    Candidate {
        title: title.to_string(),
        year,
        slug: slug.map(|s| s.to_string()),
    }
}

pub fn poster(slug: &str, title: &str, year: Option<i32>) -> PosterFilm {
    PosterFilm {
        slug: slug.to_string(),
        title: title.to_string(),
        year,
    }
}

pub fn draft_pick(id: &str, title: &str, year: Option<i32>, tmdb_id: Option<u64>) -> Value {
    json!({
        "id": id,
        "movie_id": tmdb_id,
        "movie_title": title,
        "movie_year": year,
        "letterboxd_rating": null,
    })
}

/// In-memory Letterboxd that records every call.
#[derive(Default)]
pub struct FakeSource {
    films: HashMap<String, Film>,
    broken_films: HashSet<String>,
    searches: HashMap<String, Vec<Candidate>>,
    broken_searches: HashSet<String>,
    pub lookups: Mutex<Vec<String>>,
    pub queries: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_film(mut self, film: Film) -> Self {
        self.films.insert(film.slug.clone(), film);
        self
    }

    /// Lookups of `slug` fail like a dropped connection would.
    pub fn with_broken_film(mut self, slug: &str) -> Self {
        self.broken_films.insert(slug.to_string());
        self
    }

    pub fn with_search(mut self, query: &str, candidates: Vec<Candidate>) -> Self {
        self.searches.insert(query.to_string(), candidates);
        self
    }

    pub fn with_broken_search(mut self, query: &str) -> Self {
        self.broken_searches.insert(query.to_string());
        self
    }

    pub fn search_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.lock().unwrap().len()
    }
}

#[async_trait]
impl FilmSource for FakeSource {
    async fn lookup(&self, slug: &str) -> Result<Film, SourceError> {
        self.lookups.lock().unwrap().push(slug.to_string());

        if self.broken_films.contains(slug) {
            return Err(SourceError::Http {
                url: format!("/film/{}/", slug),
                message: "connection reset".to_string(),
            });
        }

        self.films
            .get(slug)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(format!("/film/{}/", slug)))
    }

    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<Candidate>, SourceError> {
        self.queries.lock().unwrap().push(query.to_string());

        if self.broken_searches.contains(query) {
            return Err(SourceError::Http {
                url: format!("/search/films/{}/", query),
                message: "timed out".to_string(),
            });
        }

        let mut results = self.searches.get(query).cloned().unwrap_or_default();
        results.truncate(max_results);
        Ok(results)
    }
}

/// In-memory tables evaluating filters the way PostgREST does.
#[derive(Default)]
pub struct MemoryBackend {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    unavailable: AtomicBool,
    writes_unavailable: AtomicBool,
    frozen_ids: HashSet<String>,
    pub updates: Mutex<Vec<(String, Vec<Filter>, Value)>>,
    pub inserts: Mutex<Vec<(String, Value)>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(self, table: &str, rows: Vec<Value>) -> Self {
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .extend(rows);
        self
    }

    /// Updates of this row id match nothing, as if the row vanished.
    pub fn with_frozen_id(mut self, id: &str) -> Self {
        self.frozen_ids.insert(id.to_string());
        self
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Reads keep working, writes fail as if the connection dropped.
    pub fn set_writes_unavailable(&self, unavailable: bool) {
        self.writes_unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn update_count(&self) -> usize {
        self.updates.lock().unwrap().len()
    }

    pub fn insert_count(&self) -> usize {
        self.inserts.lock().unwrap().len()
    }

    fn check_available(&self) -> Result<(), BackendError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }

    fn check_writable(&self) -> Result<(), BackendError> {
        self.check_available()?;
        if self.writes_unavailable.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("connection reset".to_string()));
        }
        Ok(())
    }
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn row_matches(row: &Value, filters: &[Filter]) -> bool {
    filters.iter().all(|filter| match filter {
        Filter::Eq(column, value) => text_of(&row[column.as_str()]).as_ref() == Some(value),
        Filter::IsNull(column) => row[column.as_str()].is_null(),
        Filter::NotNull(column) => !row[column.as_str()].is_null(),
        Filter::ILike(column, pattern) => row[column.as_str()]
            .as_str()
            .map_or(false, |s| {
                s.to_lowercase().contains(&pattern.to_lowercase())
            }),
        Filter::Limit(_) => true,
    })
}

fn limit_of(filters: &[Filter]) -> usize {
    filters
        .iter()
        .find_map(|f| match f {
            Filter::Limit(limit) => Some(*limit),
            _ => None,
        })
        .unwrap_or(usize::MAX)
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn select(
        &self,
        table: &str,
        _columns: &str,
        filters: &[Filter],
    ) -> Result<Vec<Value>, BackendError> {
        self.check_available()?;

        Ok(self
            .rows(table)
            .into_iter()
            .filter(|row| row_matches(row, filters))
            .take(limit_of(filters))
            .collect())
    }

    async fn update(
        &self,
        table: &str,
        filters: &[Filter],
        fields: Value,
    ) -> Result<Vec<Value>, BackendError> {
        self.check_writable()?;
        self.updates
            .lock()
            .unwrap()
            .push((table.to_string(), filters.to_vec(), fields.clone()));

        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table.to_string()).or_default();

        let mut updated = vec![];
        for row in rows.iter_mut() {
            let frozen = row["id"]
                .as_str()
                .map_or(false, |id| self.frozen_ids.contains(id));
            if frozen || !row_matches(row, filters) {
                continue;
            }
            if let (Some(row_fields), Some(new_fields)) =
                (row.as_object_mut(), fields.as_object())
            {
                for (key, value) in new_fields {
                    row_fields.insert(key.clone(), value.clone());
                }
            }
            updated.push(row.clone());
        }

        Ok(updated)
    }

    async fn insert(&self, table: &str, fields: Value) -> Result<Vec<Value>, BackendError> {
        self.check_writable()?;
        self.inserts
            .lock()
            .unwrap()
            .push((table.to_string(), fields.clone()));

        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .push(fields.clone());
        Ok(vec![fields])
    }
}

/// Keeps every progress event for assertions.
#[derive(Default)]
pub struct RecordingSink {
    pub states: Mutex<Vec<(String, RecordState)>>,
    pub dry_runs: Mutex<Vec<(String, Resolution)>>,
    pub finished: Mutex<Option<Tally>>,
    pub synced: Mutex<Vec<(String, SyncOutcome)>>,
    pub sync_finished: Mutex<Option<SyncTally>>,
}

impl RecordingSink {
    pub fn states_of(&self, id: &str) -> Vec<RecordState> {
        self.states
            .lock()
            .unwrap()
            .iter()
            .filter(|(record_id, _)| record_id == id)
            .map(|(_, state)| state.clone())
            .collect()
    }

    pub fn terminal_states(&self) -> Vec<(String, RecordState)> {
        self.states
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, state)| state.is_terminal())
            .cloned()
            .collect()
    }
}

impl ProgressSink for RecordingSink {
    fn record_state(
        &self,
        _position: usize,
        _total: usize,
        record: &TargetRecord,
        state: &RecordState,
    ) {
        self.states
            .lock()
            .unwrap()
            .push((record.id.clone(), state.clone()));
    }

    fn dry_run_match(&self, record: &TargetRecord, resolution: &Resolution) {
        self.dry_runs
            .lock()
            .unwrap()
            .push((record.id.clone(), resolution.clone()));
    }

    fn batch_finished(&self, tally: &Tally, _dry_run: bool) {
        *self.finished.lock().unwrap() = Some(*tally);
    }

    fn film_synced(&self, film: &PosterFilm, outcome: &SyncOutcome) {
        self.synced
            .lock()
            .unwrap()
            .push((film.slug.clone(), outcome.clone()));
    }

    fn sync_finished(&self, tally: &SyncTally, _dry_run: bool) {
        *self.sync_finished.lock().unwrap() = Some(*tally);
    }
}

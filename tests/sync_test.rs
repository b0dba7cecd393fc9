mod common;

use std::sync::Arc;

use common::{film, poster, with_tmdb, FakeSource, MemoryBackend, RecordingSink};
use letterboxd2supabase::{
    error::SyncError,
    model::{film::PosterFilm, tally::SyncTally},
    sync::{SpecDraftSync, SyncOutcome, SPEC_DRAFT_MOVIES_TABLE},
};
use serde_json::json;

fn source() -> Arc<FakeSource> {
    let matrix = film("the-matrix", "The Matrix", Some(1999), None);
    let casablanca = film("casablanca", "Casablanca", Some(1942), None);
    Arc::new(
        FakeSource::new()
            .with_film(with_tmdb(matrix, 603))
            .with_film(with_tmdb(casablanca, 289))
            .with_film(film("no-tmdb", "No TMDb", Some(2020), None)),
    )
}

fn matrix_and_casablanca() -> Vec<PosterFilm> {
    vec![
        poster("the-matrix", "The Matrix", Some(1999)),
        poster("casablanca", "Casablanca", None),
    ]
}

#[tokio::test]
async fn inserts_new_films_into_spec_draft() {
    let backend = Arc::new(MemoryBackend::new());
    let sink = Arc::new(RecordingSink::default());
    let sync = SpecDraftSync::new(source(), backend.clone(), sink.clone());

    let tally = sync
        .sync_films(&matrix_and_casablanca(), "draft-1", false)
        .await
        .unwrap();

    assert_eq!(
        tally,
        SyncTally {
            synced: 2,
            skipped: 0,
            errored: 0
        }
    );
    assert_eq!(
        backend.rows(SPEC_DRAFT_MOVIES_TABLE),
        vec![
            json!({
                "spec_draft_id": "draft-1",
                "movie_tmdb_id": 603,
                "movie_title": "The Matrix",
                "movie_year": 1999,
            }),
            json!({
                "spec_draft_id": "draft-1",
                "movie_tmdb_id": 289,
                "movie_title": "Casablanca",
                "movie_year": 1942,
            }),
        ]
    );
    assert_eq!(*sink.sync_finished.lock().unwrap(), Some(tally));
}

#[tokio::test]
async fn films_already_in_the_draft_are_skipped() {
    let existing = json!({ "id": 1, "spec_draft_id": "draft-1", "movie_tmdb_id": 603 });
    let backend = Arc::new(MemoryBackend::new().with_rows(
        SPEC_DRAFT_MOVIES_TABLE,
        vec![existing],
    ));
    let sink = Arc::new(RecordingSink::default());
    let sync = SpecDraftSync::new(source(), backend.clone(), sink.clone());
    let films = [poster("the-matrix", "The Matrix", Some(1999))];

    let tally = sync.sync_films(&films, "draft-1", false).await.unwrap();

    assert_eq!(tally.skipped, 1);
    assert_eq!(backend.insert_count(), 0);
    assert!(matches!(
        &sink.synced.lock().unwrap()[0].1,
        SyncOutcome::Skipped(_)
    ));
}

#[tokio::test]
async fn same_film_in_another_draft_is_still_added() {
    let existing = json!({ "id": 1, "spec_draft_id": "draft-2", "movie_tmdb_id": 603 });
    let backend = Arc::new(MemoryBackend::new().with_rows(
        SPEC_DRAFT_MOVIES_TABLE,
        vec![existing],
    ));
    let sink = Arc::new(RecordingSink::default());
    let sync = SpecDraftSync::new(source(), backend.clone(), sink);
    let films = [poster("the-matrix", "The Matrix", Some(1999))];

    let tally = sync.sync_films(&films, "draft-1", false).await.unwrap();

    assert_eq!(tally.synced, 1);
    assert_eq!(backend.insert_count(), 1);
}

#[tokio::test]
async fn films_without_tmdb_id_are_skipped() {
    let backend = Arc::new(MemoryBackend::new());
    let sink = Arc::new(RecordingSink::default());
    let sync = SpecDraftSync::new(source(), backend.clone(), sink);

    let tally = sync
        .sync_films(
            &[
                poster("no-tmdb", "No TMDb", Some(2020)),
                poster("missing-page", "Missing", None),
            ],
            "draft-1",
            false,
        )
        .await
        .unwrap();

    assert_eq!(tally.skipped, 2);
    assert_eq!(tally.processed(), 2);
    assert_eq!(backend.insert_count(), 0);
}

#[tokio::test]
async fn dry_run_inserts_nothing() {
    let backend = Arc::new(MemoryBackend::new());
    let sink = Arc::new(RecordingSink::default());
    let sync = SpecDraftSync::new(source(), backend.clone(), sink.clone());
    let films = [poster("the-matrix", "The Matrix", Some(1999))];

    let tally = sync.sync_films(&films, "draft-1", true).await.unwrap();

    assert_eq!(tally.synced, 1);
    assert_eq!(backend.insert_count(), 0);
    assert_eq!(
        *sink.synced.lock().unwrap(),
        vec![(
            "the-matrix".to_string(),
            SyncOutcome::WouldSync { tmdb_id: 603 }
        )]
    );
}

#[tokio::test]
async fn unavailable_backend_aborts_sync() {
    let backend = Arc::new(MemoryBackend::new());
    backend.set_unavailable(true);
    let sink = Arc::new(RecordingSink::default());
    let sync = SpecDraftSync::new(source(), backend, sink.clone());

    let err = sync
        .sync_films(&matrix_and_casablanca(), "draft-1", false)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SyncError::BackendUnavailable { tally, .. }
            if tally.errored == 1 && tally.processed() == 1
    ));
    assert!(sink.synced.lock().unwrap().is_empty());
    assert!(sink.sync_finished.lock().unwrap().is_none());
}

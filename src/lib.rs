use std::{path::Path, sync::Arc};

pub mod batch;
pub mod clients;
pub mod config;
pub mod error;
pub mod extractors;
pub mod fetchers;
pub mod model;
pub mod persisters;
pub mod progress;
pub mod rating_fetcher;
pub mod resolver;
pub mod slug;
pub mod sync;
pub mod writer;

use batch::BatchDriver;
use clients::{
    letterboxd_client::LetterboxdClient, supabase_client::SupabaseClient, Backend, FilmSource,
    Filter,
};
use config::SupabaseConfig;
use error::{AppError, WriteError};
use fetchers::{
    diary_fetcher::DiaryFetcher, list_fetcher::ListFetcher, watchlist_fetcher::WatchlistFetcher,
};
use model::{
    film::PosterFilm,
    rating::Rating,
    record::RecordKey,
    tally::{SyncTally, Tally},
};
use persisters::csv_writer::CsvWriter;
use progress::LogSink;
use rating_fetcher::RatingFetcher;
use resolver::{IdentifierResolver, MAX_SEARCH_RESULTS};
use sync::SpecDraftSync;
use writer::ReconciliationWriter;

fn letterboxd_client() -> Result<Arc<LetterboxdClient>, AppError> {
    Ok(Arc::new(LetterboxdClient::new()?))
}

fn supabase_client() -> Result<Arc<SupabaseClient>, AppError> {
    let config = SupabaseConfig::from_env()?;
    Ok(Arc::new(SupabaseClient::new(&config)?))
}

/// Resolves a title to its Letterboxd rating, optionally storing it on the
/// matching `draft_picks` row.
pub async fn fetch_rating(
    title: &str,
    year: Option<i32>,
    tmdb_id: Option<u64>,
    write: bool,
) -> Result<Rating, AppError> {
    // Fail on missing credentials before touching Letterboxd.
    let writer = if write {
        Some(ReconciliationWriter::new(supabase_client()?))
    } else {
        None
    };

    let source: Arc<dyn FilmSource> = letterboxd_client()?;
    let slug = IdentifierResolver::new(source.clone())
        .resolve_with_tmdb_id(title, year, tmdb_id)
        .await
        .into_slug()
        .ok_or_else(|| {
            AppError::NotFound(format!("Rating not found for {}", title))
        })?;

    let (film, rating) = RatingFetcher::new(source).fetch_rated_film(&slug).await?;
    if film.contradicts_tmdb_id(tmdb_id) {
        return Err(AppError::NotFound(format!(
            "{} resolved to {} with TMDB id {:?}, expected {:?}",
            title,
            slug,
            film.tmdb_id(),
            tmdb_id
        )));
    }

    if let Some(writer) = writer {
        let key = RecordKey::TitleYear {
            title: title.to_string(),
            year,
        };
        match writer.write_rating(&key, rating).await {
            Ok(updated) => log::info!(
                "Updated {} row(s) of {} with rating {}",
                updated.rows,
                key,
                rating
            ),
            Err(WriteError::RecordNotFound(_)) => {
                log::warn!("No movie found matching {}, nothing to update", key)
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(rating)
}

pub async fn run_batch(limit: usize, dry_run: bool) -> Result<Tally, AppError> {
    let backend = supabase_client()?;
    let driver = BatchDriver::new(letterboxd_client()?, backend, Arc::new(LogSink));
    Ok(driver.run_batch(limit, dry_run).await?)
}

pub async fn show_film(slug: &str) -> Result<(), AppError> {
    let film = letterboxd_client()?.get_film(slug).await?;
    let rating = RatingFetcher::rating_from_film(&film).ok();

    let output = serde_json::json!({
        "slug": film.slug,
        "title": film.title,
        "year": film.year,
        "director": film.director,
        "genres": film.genres,
        "tmdb_link": film.tmdb_link,
        "tmdb_id": film.tmdb_id(),
        "rating": rating,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub async fn search_films(query: &str, max_results: Option<usize>) -> Result<(), AppError> {
    let candidates = letterboxd_client()?
        .search_films(query, max_results.unwrap_or(MAX_SEARCH_RESULTS))
        .await?;
    log::info!("Found {} results for: {}", candidates.len(), query);
    println!("{}", serde_json::to_string_pretty(&candidates)?);
    Ok(())
}

pub async fn export_list(
    user: &str,
    list_slug: &str,
    csv_path: Option<&Path>,
) -> Result<(), AppError> {
    let list = ListFetcher::new(letterboxd_client()?)
        .get_list(user, list_slug)
        .await?;
    output_films(&list.films, csv_path)?;
    if csv_path.is_none() {
        log::info!("List: {}", list.title);
    }
    Ok(())
}

pub async fn export_watchlist(
    user: &str,
    max_films: Option<usize>,
    csv_path: Option<&Path>,
) -> Result<(), AppError> {
    let films = WatchlistFetcher::new(letterboxd_client()?)
        .get_watchlist(user, max_films)
        .await?;
    output_films(&films, csv_path)
}

pub async fn show_user_profile(user: &str) -> Result<(), AppError> {
    let profile = letterboxd_client()?.get_user_profile(user).await?;
    println!("{}", serde_json::to_string_pretty(&profile)?);
    Ok(())
}

/// Prints a user's diary, newest viewing first, with each film's TMDB link.
pub async fn show_diary(user: &str, max_entries: Option<usize>) -> Result<(), AppError> {
    let entries = DiaryFetcher::new(letterboxd_client()?)
        .get_diary(user, max_entries)
        .await?;

    let output = serde_json::json!({
        "username": user,
        "diary": entries,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn output_films(films: &[PosterFilm], csv_path: Option<&Path>) -> Result<(), AppError> {
    match csv_path {
        Some(path) => {
            CsvWriter::save_films_to_csv(films, path)?;
            log::info!("Successfully generated file: {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(films)?),
    }
    Ok(())
}

pub async fn sync_list(
    user: &str,
    list_slug: &str,
    spec_draft_id: &str,
    dry_run: bool,
) -> Result<SyncTally, AppError> {
    let backend = supabase_client()?;
    let client = letterboxd_client()?;
    let list = ListFetcher::new(client.clone())
        .get_list(user, list_slug)
        .await?;

    let sync = SpecDraftSync::new(client, backend, Arc::new(LogSink));
    Ok(sync.sync_films(&list.films, spec_draft_id, dry_run).await?)
}

pub async fn sync_watchlist(
    user: &str,
    spec_draft_id: &str,
    max_films: Option<usize>,
    dry_run: bool,
) -> Result<SyncTally, AppError> {
    let backend = supabase_client()?;
    let client = letterboxd_client()?;
    let films = WatchlistFetcher::new(client.clone())
        .get_watchlist(user, max_films)
        .await?;

    let sync = SpecDraftSync::new(client, backend, Arc::new(LogSink));
    Ok(sync.sync_films(&films, spec_draft_id, dry_run).await?)
}

/// Checks that both Letterboxd and Supabase answer.
pub async fn check_connections() -> Result<(), AppError> {
    let client = letterboxd_client()?;
    let film = client.get_film("v-for-vendetta").await?;
    log::info!("Letterboxd film fetch works: {}", film.title);
    let results = client.search_films("V for Vendetta", 3).await?;
    log::info!("Letterboxd search works: {} results", results.len());

    let backend = supabase_client()?;
    let rows = backend
        .select("spec_drafts", "id,name", &[Filter::Limit(1)])
        .await?;
    if rows.is_empty() {
        log::warn!("Database connection successful but no spec drafts found");
    } else {
        log::info!(
            "Database connection successful (found {} spec draft(s))",
            rows.len()
        );
    }

    Ok(())
}

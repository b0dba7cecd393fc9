use std::sync::Arc;

use crate::{
    clients::letterboxd_client::LetterboxdClient, extractors::film_extractor::FilmExtractor,
    model::film::PosterFilm,
};

pub mod diary_fetcher;
pub mod list_fetcher;
pub mod watchlist_fetcher;

/// Fetches the given pages concurrently and extracts each one, returning the
/// results in page order. Pages that fail are logged and come back empty.
async fn fetch_pages<T: Send + 'static>(
    letterboxd_client: Arc<LetterboxdClient>,
    page_urls: Vec<String>,
    extract: fn(&str) -> Vec<T>,
) -> Vec<Vec<T>> {
    let mut handles = vec![];

    for page_url in page_urls {
        let client = letterboxd_client.clone();
        handles.push(tokio::spawn(async move {
            match client.get_html_from_url(&page_url).await {
                Ok(page_html) => extract(&page_html),
                Err(e) => {
                    log::warn!("Failed to get html for url {}. Error: {}", page_url, e);
                    vec![]
                }
            }
        }));
    }

    let mut pages = vec![];
    for handle in handles {
        match handle.await {
            Ok(page) => pages.push(page),
            Err(e) => log::error!("Page fetching task failed: {}", e),
        }
    }

    pages
}

async fn fetch_poster_pages(
    letterboxd_client: Arc<LetterboxdClient>,
    page_urls: Vec<String>,
) -> Vec<PosterFilm> {
    let pages = fetch_pages(
        letterboxd_client,
        page_urls,
        FilmExtractor::extract_poster_films,
    )
    .await;

    let mut films = vec![];
    for page_films in pages {
        merge_unique(&mut films, page_films);
    }

    films
}

fn merge_unique(films: &mut Vec<PosterFilm>, more: Vec<PosterFilm>) {
    for film in more {
        if !films.iter().any(|f| f.slug == film.slug) {
            films.push(film);
        }
    }
}

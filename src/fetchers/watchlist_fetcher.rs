use std::sync::Arc;

use crate::{
    clients::letterboxd_client::LetterboxdClient,
    error::SourceError,
    extractors::film_extractor::FilmExtractor,
    fetchers::{fetch_poster_pages, merge_unique},
    model::film::PosterFilm,
};

#[derive(Clone)]
pub struct WatchlistFetcher {
    letterboxd_client: Arc<LetterboxdClient>,
}

impl WatchlistFetcher {
    pub fn new(letterboxd_client: Arc<LetterboxdClient>) -> Self {
        WatchlistFetcher { letterboxd_client }
    }

    pub async fn get_watchlist(
        &self,
        user: &str,
        max_films: Option<usize>,
    ) -> Result<Vec<PosterFilm>, SourceError> {
        log::info!("Fetching watchlist for user {}", user);

        let first_page_html = self
            .letterboxd_client
            .get_html_from_url(&self.letterboxd_client.watchlist_page_url(user, 1))
            .await?;
        let mut films = FilmExtractor::extract_poster_films(&first_page_html);

        let enough =
            |films: &Vec<PosterFilm>| max_films.map_or(false, |max| films.len() >= max);
        if !enough(&films) {
            let number_of_pages = FilmExtractor::get_last_page_from_html(&first_page_html)
                .unwrap_or(1);
            log::info!("Number of watchlist pages {}", number_of_pages);

            let other_pages = (2..=number_of_pages)
                .map(|page| self.letterboxd_client.watchlist_page_url(user, page))
                .collect();
            merge_unique(
                &mut films,
                fetch_poster_pages(self.letterboxd_client.clone(), other_pages).await,
            );
        }

        if let Some(max) = max_films {
            films.truncate(max);
        }

        log::info!(
            "Fetched watchlist for user: {} ({} films)",
            user,
            films.len()
        );
        Ok(films)
    }
}

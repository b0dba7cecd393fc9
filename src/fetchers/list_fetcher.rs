use std::sync::Arc;

use crate::{
    clients::letterboxd_client::LetterboxdClient,
    error::SourceError,
    extractors::film_extractor::FilmExtractor,
    fetchers::{fetch_poster_pages, merge_unique},
    model::film::FilmList,
};

#[derive(Clone)]
pub struct ListFetcher {
    letterboxd_client: Arc<LetterboxdClient>,
}

impl ListFetcher {
    pub fn new(letterboxd_client: Arc<LetterboxdClient>) -> Self {
        ListFetcher { letterboxd_client }
    }

    /// All films of a user's list. The first page must load; later pages are best effort.
    pub async fn get_list(&self, user: &str, list_slug: &str) -> Result<FilmList, SourceError> {
        log::info!("Fetching list from Letterboxd: {}/{}", user, list_slug);

        let first_page_url = self.letterboxd_client.list_page_url(user, list_slug, 1);
        let first_page_html = self
            .letterboxd_client
            .get_html_from_url(&first_page_url)
            .await?;

        let title = FilmExtractor::extract_list_title(&first_page_html)
            .unwrap_or_else(|| list_slug.to_string());
        let number_of_pages = FilmExtractor::get_last_page_from_html(&first_page_html)
            .unwrap_or(1);
        log::info!("Number of list pages {}", number_of_pages);

        let mut films = FilmExtractor::extract_poster_films(&first_page_html);
        let other_pages = (2..=number_of_pages)
            .map(|page| {
                self.letterboxd_client.list_page_url(user, list_slug, page)
            })
            .collect();
        merge_unique(
            &mut films,
            fetch_poster_pages(self.letterboxd_client.clone(), other_pages).await,
        );

        log::info!("Fetched list: {} ({} films)", title, films.len());
        Ok(FilmList { title, films })
    }
}

use std::sync::Arc;

use crate::{
    clients::letterboxd_client::LetterboxdClient, error::SourceError,
    extractors::film_extractor::FilmExtractor, fetchers::fetch_pages, model::user::DiaryEntry,
};

#[derive(Clone)]
pub struct DiaryFetcher {
    letterboxd_client: Arc<LetterboxdClient>,
}

impl DiaryFetcher {
    pub fn new(letterboxd_client: Arc<LetterboxdClient>) -> Self {
        DiaryFetcher { letterboxd_client }
    }

    /// Diary entries, newest first, each with the TMDB link of its film.
    /// Rewatches show up once per viewing.
    pub async fn get_diary(
        &self,
        user: &str,
        max_entries: Option<usize>,
    ) -> Result<Vec<DiaryEntry>, SourceError> {
        log::info!("Fetching diary for user {}", user);

        let first_page_html = self
            .letterboxd_client
            .get_html_from_url(&self.letterboxd_client.diary_page_url(user, 1))
            .await?;
        let mut entries = FilmExtractor::extract_diary_entries(&first_page_html);

        let enough =
            |entries: &Vec<DiaryEntry>| max_entries.map_or(false, |max| entries.len() >= max);
        if !enough(&entries) {
            let number_of_pages = FilmExtractor::get_last_page_from_html(&first_page_html)
                .unwrap_or(1);
            log::info!("Number of diary pages {}", number_of_pages);

            let other_pages = (2..=number_of_pages)
                .map(|page| self.letterboxd_client.diary_page_url(user, page))
                .collect();
            let pages = fetch_pages(
                self.letterboxd_client.clone(),
                other_pages,
                FilmExtractor::extract_diary_entries,
            )
            .await;
            entries.extend(pages.into_iter().flatten());
        }

        if let Some(max) = max_entries {
            entries.truncate(max);
        }

        let entries = self.fill_tmdb_links(entries).await;
        log::info!(
            "Fetched diary for user: {} ({} entries)",
            user,
            entries.len()
        );
        Ok(entries)
    }

    /// Looks up every entry's film page concurrently. An entry whose page fails
    /// keeps `tmdb_link: None`.
    async fn fill_tmdb_links(&self, entries: Vec<DiaryEntry>) -> Vec<DiaryEntry> {
        let mut handles = vec![];

        for entry in entries {
            let client = self.letterboxd_client.clone();
            handles.push(tokio::spawn(async move {
                match client.get_film(&entry.slug).await {
                    Ok(film) => DiaryEntry {
                        tmdb_link: film.tmdb_link,
                        ..entry
                    },
                    Err(e) => {
                        log::warn!("Failed to get film page for {}. Error: {}", entry.slug, e);
                        entry
                    }
                }
            }));
        }

        let mut filled = vec![];
        for handle in handles {
            match handle.await {
                Ok(entry) => filled.push(entry),
                Err(e) => log::error!("Film page task failed: {}", e),
            }
        }

        filled
    }
}

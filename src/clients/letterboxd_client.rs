use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use tokio_retry::{
    strategy::{jitter, ExponentialBackoff},
    RetryIf,
};

use crate::{
    clients::FilmSource,
    error::SourceError,
    extractors::film_extractor::FilmExtractor,
    model::{
        film::{Candidate, Film, LETTERBOXD_BASE_URL},
        user::UserProfile,
    },
};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct LetterboxdClient {
    client: Client,
    base_url: String,
}

impl LetterboxdClient {
    pub fn new() -> Result<Self, SourceError> {
        Self::with_base_url(LETTERBOXD_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, SourceError> {
        let user_agent = header::HeaderValue::from_static(USER_AGENT);
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| SourceError::Http {
                url: base_url.to_string(),
                message: format!("could not build http client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn film_url(&self, slug: &str) -> String {
        format!("{}/film/{}/", self.base_url, slug)
    }

    pub fn search_url(&self, query: &str) -> String {
        format!(
            "{}/search/films/{}/",
            self.base_url,
            urlencoding::encode(query)
        )
    }

    pub fn list_page_url(&self, user: &str, list_slug: &str, page: u32) -> String {
        if page == 1 {
            return format!("{}/{}/list/{}/", self.base_url, user, list_slug);
        }

        format!(
            "{}/{}/list/{}/page/{}/",
            self.base_url, user, list_slug, page
        )
    }

    pub fn watchlist_page_url(&self, user: &str, page: u32) -> String {
        if page == 1 {
            return format!("{}/{}/watchlist/", self.base_url, user);
        }

        format!("{}/{}/watchlist/page/{}/", self.base_url, user, page)
    }

    pub fn profile_url(&self, user: &str) -> String {
        format!("{}/{}/", self.base_url, user)
    }

    pub fn diary_page_url(&self, user: &str, page: u32) -> String {
        if page == 1 {
            return format!("{}/{}/films/diary/", self.base_url, user);
        }

        format!("{}/{}/films/diary/page/{}/", self.base_url, user, page)
    }

    /// GETs a page, retrying transient failures. A 404 is final.
    pub async fn get_html_from_url(&self, url: &str) -> Result<String, SourceError> {
        let retry_strategy = ExponentialBackoff::from_millis(10).map(jitter).take(5);
        RetryIf::spawn(
            retry_strategy,
            || self.get_html_from_url_no_retry(url),
            |e: &SourceError| !matches!(e, SourceError::NotFound(_)),
        )
        .await
    }

    async fn get_html_from_url_no_retry(&self, url: &str) -> Result<String, SourceError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::Http {
                url: url.to_string(),
                message: format!("{:?}", e),
            })?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound(url.to_string()));
        }

        if !resp.status().is_success() {
            return Err(SourceError::Http {
                url: url.to_string(),
                message: format!("received status {}", resp.status()),
            });
        }

        resp.text().await.map_err(|e| SourceError::Http {
            url: url.to_string(),
            message: format!("failed to get text: {}", e),
        })
    }

    pub async fn get_film(&self, slug: &str) -> Result<Film, SourceError> {
        let url = self.film_url(slug);
        log::debug!("Fetching film page {}", url);
        let html_body = self.get_html_from_url(&url).await?;
        FilmExtractor::extract_film_from_html(&html_body, slug, &url)
    }

    pub async fn search_films(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<Candidate>, SourceError> {
        let url = self.search_url(query);
        log::debug!("Searching films with {}", url);
        let html_body = self.get_html_from_url(&url).await?;
        Ok(FilmExtractor::extract_search_results(
            &html_body,
            max_results,
        ))
    }

    pub async fn get_user_profile(&self, user: &str) -> Result<UserProfile, SourceError> {
        let url = self.profile_url(user);
        log::debug!("Fetching profile page {}", url);
        let html_body = self.get_html_from_url(&url).await?;
        Ok(FilmExtractor::extract_user_profile(&html_body, user))
    }
}

#[async_trait]
impl FilmSource for LetterboxdClient {
    async fn lookup(&self, slug: &str) -> Result<Film, SourceError> {
        self.get_film(slug).await
    }

    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<Candidate>, SourceError> {
        self.search_films(query, max_results).await
    }
}

use std::sync::Arc;

use crate::{
    clients::FilmSource,
    error::{FetchError, SourceError},
    model::{film::Film, rating::Rating},
};

pub struct RatingFetcher {
    source: Arc<dyn FilmSource>,
}

impl RatingFetcher {
    pub fn new(source: Arc<dyn FilmSource>) -> Self {
        RatingFetcher { source }
    }

    pub async fn fetch_rating(&self, slug: &str) -> Result<Rating, FetchError> {
        self.fetch_rated_film(slug).await.map(|(_, rating)| rating)
    }

    /// Looks up the film and reads its rating, keeping the film for cross-checks.
    pub async fn fetch_rated_film(&self, slug: &str) -> Result<(Film, Rating), FetchError> {
        let film = self.source.lookup(slug).await.map_err(|e| match e {
            SourceError::NotFound(_) => FetchError::NotFound(slug.to_string()),
            e => FetchError::Source(e),
        })?;

        let rating = Self::rating_from_film(&film)?;
        log::info!("Found Letterboxd rating for {}: {}", film.title, rating);
        Ok((film, rating))
    }

    /// The first rating field present decides; an unparsable value counts as absent.
    pub fn rating_from_film(film: &Film) -> Result<Rating, FetchError> {
        let raw = film
            .raw_rating()
            .ok_or_else(|| FetchError::NotFound(film.title.clone()))?;

        let value = raw.trim().parse::<f64>().map_err(|_| {
            log::warn!(
                "Could not convert rating to float for {}: {}",
                film.title,
                raw
            );
            FetchError::NotFound(film.title.clone())
        })?;

        Rating::new(value).ok_or_else(|| {
            log::warn!("Invalid rating value for {}: {}", film.title, value);
            FetchError::OutOfRange(value)
        })
    }
}

use thiserror::Error;

use crate::model::tally::{SyncTally, Tally};

/// Failures talking to Letterboxd.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("404 page not found: {0}")]
    NotFound(String),

    #[error("failed to get HTML for url {url}: {message}")]
    Http { url: String, message: String },

    #[error("could not extract {what} from page {url}")]
    Parse { url: String, what: &'static str },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "Supabase credentials not found in environment. \
         Set SUPABASE_URL and SUPABASE_SERVICE_ROLE_KEY (or SUPABASE_ANON_KEY)"
    )]
    MissingCredentials,
}

/// Failures talking to the Supabase REST backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("backend returned status {status} for table {table}: {body}")]
    Status {
        table: String,
        status: u16,
        body: String,
    },

    #[error("could not decode rows from table {table}: {message}")]
    Decode { table: String, message: String },
}

impl BackendError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, BackendError::Unavailable(_))
    }
}

impl From<ConfigError> for BackendError {
    fn from(e: ConfigError) -> Self {
        BackendError::Unavailable(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no rating found for {0}")]
    NotFound(String),

    #[error("rating {0} is outside the 0-5 scale")]
    OutOfRange(f64),

    #[error(transparent)]
    Source(#[from] SourceError),
}

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("update of record {0} affected no rows")]
    NoRowsAffected(String),

    #[error("no record found matching {0}")]
    RecordNotFound(String),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("could not query records missing a rating: {0}")]
    Query(#[source] BackendError),

    #[error("backend became unavailable after {} records: {source}", .tally.total)]
    BackendUnavailable {
        tally: Tally,
        #[source]
        source: BackendError,
    },
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("backend became unavailable after {} films: {source}", .tally.processed())]
    BackendUnavailable {
        tally: SyncTally,
        #[source]
        source: BackendError,
    },
}

/// Everything a command can fail with; the binary maps any of these to exit code 1.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("error when writing csv file: {0}")]
    Csv(#[from] csv::Error),

    #[error("error when serializing output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    NotFound(String),
}

impl AppError {
    /// Failures that mean "this film has no usable rating", as opposed to a
    /// broken connection or bad configuration.
    pub fn is_rating_not_found(&self) -> bool {
        matches!(
            self,
            AppError::NotFound(_)
                | AppError::Fetch(FetchError::NotFound(_) | FetchError::OutOfRange(_))
        )
    }
}

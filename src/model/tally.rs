use std::fmt;

use serde::Serialize;

/// Outcome counters of one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub updated: usize,
    pub skipped: usize,
    pub errored: usize,
    pub total: usize,
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "updated: {}, skipped: {}, errors: {}, total processed: {}",
            self.updated, self.skipped, self.errored, self.total
        )
    }
}

/// Outcome counters of a list or watchlist sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncTally {
    pub synced: usize,
    pub skipped: usize,
    pub errored: usize,
}

impl SyncTally {
    pub fn processed(&self) -> usize {
        self.synced + self.skipped + self.errored
    }
}

impl fmt::Display for SyncTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "synced: {}, skipped: {}, errors: {}",
            self.synced, self.skipped, self.errored
        )
    }
}

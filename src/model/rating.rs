use std::fmt;

use serde::Serialize;

pub const MIN_RATING: f64 = 0.0;
pub const MAX_RATING: f64 = 5.0;

/// A Letterboxd average rating, always within `[0, 5]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Rating(f64);

impl Rating {
    /// Values outside the scale (and NaN) are rejected, never clamped.
    pub fn new(value: f64) -> Option<Rating> {
        if (MIN_RATING..=MAX_RATING).contains(&value) {
            Some(Rating(value))
        } else {
            None
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/5", self.0)
    }
}

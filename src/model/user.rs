use serde::Serialize;

use crate::model::rating::Rating;

/// Public summary of a Letterboxd member.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserProfile {
    pub username: String,
    pub display_name: String,
    pub watched_count: Option<u32>,
    pub watchlist_count: Option<u32>,
    pub likes_count: Option<u32>,
    pub lists_count: Option<u32>,
}

/// One logged viewing in a member's diary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiaryEntry {
    pub slug: String,
    pub title: String,
    pub year: Option<i32>,
    pub tmdb_link: Option<String>,
    /// `YYYY-MM-DD`.
    pub watched_date: Option<String>,
    /// The member's own rating, in half stars.
    pub rating: Option<Rating>,
}

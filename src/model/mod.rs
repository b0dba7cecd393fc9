pub mod film;
pub mod rating;
pub mod record;
pub mod tally;
pub mod user;

/// Best guess at a film's Letterboxd slug from its title.
///
/// Lower-cases, turns spaces into hyphens and drops apostrophes, colons,
/// periods and commas. Letterboxd disambiguates remakes with a year suffix,
/// so the guess is only ever tried as a direct lookup.
pub fn guess_slug(title: &str) -> String {
    title
        .to_lowercase()
        .replace(' ', "-")
        .chars()
        .filter(|c| !matches!(c, '\'' | ':' | '.' | ','))
        .collect()
}

/// Extracts the numeric id from a TMDB movie URL like `https://www.themoviedb.org/movie/603/`.
pub fn extract_tmdb_id_from_url(tmdb_url: &str) -> Option<u64> {
    let (_, rest) = tmdb_url.split_once("/movie/")?;
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guesses_simple_slug() {
        assert_eq!(guess_slug("The Matrix"), "the-matrix");
    }

    #[test]
    fn strips_punctuation() {
        assert_eq!(
            guess_slug("Harry Potter and the Philosopher's Stone"),
            "harry-potter-and-the-philosophers-stone"
        );
        assert_eq!(
            guess_slug("Star Wars: Episode IV. A New Hope, Again"),
            "star-wars-episode-iv-a-new-hope-again"
        );
    }

    #[test]
    fn extracts_tmdb_id() {
        assert_eq!(
            extract_tmdb_id_from_url("https://www.themoviedb.org/movie/603/"),
            Some(603)
        );
        assert_eq!(
            extract_tmdb_id_from_url("https://www.themoviedb.org/movie/12345-some-title"),
            Some(12345)
        );
        assert_eq!(
            extract_tmdb_id_from_url("https://www.themoviedb.org/tv/1399/"),
            None
        );
        assert_eq!(extract_tmdb_id_from_url(""), None);
    }
}

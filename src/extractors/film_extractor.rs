use select::{
    document::Document,
    node::Node,
    predicate::{And, Attr, Class, Descendant, Name, Or},
};

use crate::{
    error::SourceError,
    model::{
        film::{Candidate, Film, PosterFilm},
        rating::Rating,
        user::{DiaryEntry, UserProfile},
    },
};

const CDATA_OPEN: &str = "/* <![CDATA[ */";
const CDATA_CLOSE: &str = "/* ]]> */";

#[derive(Debug)]
pub struct FilmExtractor {}

impl FilmExtractor {
    pub fn extract_film_from_html(
        html_body: &str,
        slug: &str,
        url: &str,
    ) -> Result<Film, SourceError> {
        let document = Document::from(html_body);

        let title = FilmExtractor::extract_title(&document).ok_or_else(|| SourceError::Parse {
            url: url.to_string(),
            what: "title",
        })?;

        Ok(Film {
            slug: slug.to_string(),
            title,
            year: FilmExtractor::extract_year(&document),
            genres: FilmExtractor::extract_genres(&document),
            director: FilmExtractor::extract_director(&document),
            tmdb_link: FilmExtractor::extract_tmdb_link(&document),
            rating: FilmExtractor::extract_structured_data_rating(&document),
            average_rating: FilmExtractor::extract_meta_rating(&document),
            avg_rating: FilmExtractor::extract_histogram_rating(&document),
        })
    }

    fn extract_title(document: &Document) -> Option<String> {
        document
            .find(And(Name("h1"), Class("filmtitle")))
            .map(|n| n.text().trim().to_string())
            .find(|t| !t.is_empty())
            .or_else(|| {
                FilmExtractor::meta_content(document, "property", "og:title")
                    .map(|content| split_name_and_year(&content).0)
            })
    }

    fn extract_year(document: &Document) -> Option<i32> {
        document
            .find(Name("a"))
            .filter(|n| is_year_link(n))
            .flat_map(|n| n.text().trim().parse::<i32>().ok())
            .next()
            .or_else(|| {
                FilmExtractor::meta_content(document, "property", "og:title")
                    .and_then(|content| split_name_and_year(&content).1)
            })
    }

    fn extract_genres(document: &Document) -> Vec<String> {
        let mut genres: Vec<String> = vec![];
        for genre in document
            .find(Name("a"))
            .filter(|n| href_starts_with(n, "/films/genre/"))
            .map(|n| n.text().trim().to_string())
        {
            if !genre.is_empty() && !genres.contains(&genre) {
                genres.push(genre);
            }
        }
        genres
    }

    fn extract_director(document: &Document) -> Option<String> {
        let label = FilmExtractor::meta_content(document, "name", "twitter:label1");
        if label.as_deref() == Some("Directed by") {
            if let Some(directors) =
                FilmExtractor::meta_content(document, "name", "twitter:data1")
            {
                return Some(directors);
            }
        }

        document
            .find(And(Name("a"), Class("contributor")))
            .filter(|n| href_starts_with(n, "/director/"))
            .map(|n| n.text().trim().to_string())
            .next()
    }

    fn extract_tmdb_link(document: &Document) -> Option<String> {
        document
            .find(And(Name("a"), Attr("data-track-action", "TMDb")))
            .flat_map(|n| n.attr("href"))
            .map(|href| href.to_string())
            .next()
            .or_else(|| {
                let body = document.find(Name("body")).next()?;
                let tmdb_id = body.attr("data-tmdb-id")?;
                let kind = body.attr("data-tmdb-type").unwrap_or("movie");
                Some(format!("https://www.themoviedb.org/{}/{}/", kind, tmdb_id))
            })
    }

    /// `aggregateRating.ratingValue` from the page's JSON-LD block.
    fn extract_structured_data_rating(document: &Document) -> Option<String> {
        document
            .find(And(Name("script"), Attr("type", "application/ld+json")))
            .flat_map(|n| {
                let raw = n.text();
                let json = raw.replace(CDATA_OPEN, "").replace(CDATA_CLOSE, "");
                serde_json::from_str::<serde_json::Value>(json.trim()).ok()
            })
            .flat_map(|value| match &value["aggregateRating"]["ratingValue"] {
                serde_json::Value::Number(n) => Some(n.to_string()),
                serde_json::Value::String(s) => Some(s.clone()),
                _ => None,
            })
            .next()
    }

    /// The "4.21 out of 5" summary card meta tag.
    fn extract_meta_rating(document: &Document) -> Option<String> {
        FilmExtractor::meta_content(document, "name", "twitter:data2")
            .filter(|content| content.contains("out of"))
            .and_then(|content| {
                content
                    .split_ascii_whitespace()
                    .next()
                    .map(|s| s.to_string())
            })
    }

    fn extract_histogram_rating(document: &Document) -> Option<String> {
        document
            .find(Attr("data-average-rating", ()))
            .flat_map(|n| n.attr("data-average-rating"))
            .map(|s| s.to_string())
            .next()
            .or_else(|| {
                document
                    .find(Class("average-rating"))
                    .map(|n| n.text().trim().to_string())
                    .find(|t| !t.is_empty())
            })
    }

    fn meta_content(document: &Document, key: &str, value: &str) -> Option<String> {
        document
            .find(And(Name("meta"), Attr(key, value)))
            .flat_map(|n| n.attr("content"))
            .map(|s| s.trim().to_string())
            .next()
    }

    pub fn extract_search_results(search_page_html: &str, max_results: usize) -> Vec<Candidate> {
        Document::from(search_page_html)
            .find(Descendant(And(Name("ul"), Class("results")), Name("li")))
            .flat_map(|li| FilmExtractor::extract_candidate(&li))
            .take(max_results)
            .collect()
    }

    fn extract_candidate(li: &Node) -> Option<Candidate> {
        let poster = li
            .find(Or(Attr("data-film-slug", ()), Attr("data-item-slug", ())))
            .next();
        let film_link = li
            .find(Name("a"))
            .filter(|n| href_starts_with(n, "/film/"))
            .find(|n| !n.text().trim().is_empty());

        let named = poster
            .as_ref()
            .and_then(|p| p.attr("data-item-name").or(p.attr("data-film-name")))
            .map(split_name_and_year);

        let title = film_link
            .as_ref()
            .map(|n| n.text().trim().to_string())
            .or_else(|| named.as_ref().map(|(name, _)| name.clone()))?;

        let slug = poster
            .as_ref()
            .and_then(|p| p.attr("data-film-slug").or(p.attr("data-item-slug")))
            .map(|s| s.to_string())
            .or_else(|| {
                li.find(Name("a"))
                    .flat_map(|n| n.attr("href"))
                    .flat_map(slug_from_film_href)
                    .next()
            });

        let year = li
            .find(Name("a"))
            .filter(|n| is_year_link(n))
            .flat_map(|n| n.text().trim().parse::<i32>().ok())
            .next()
            .or_else(|| named.and_then(|(_, year)| year));

        Some(Candidate { title, year, slug })
    }

    pub fn extract_poster_films(page_html: &str) -> Vec<PosterFilm> {
        let mut films: Vec<PosterFilm> = vec![];

        // Lists repeat the same film when it was added twice; keep the first.
        for film in Document::from(page_html)
            .find(Or(Attr("data-film-slug", ()), Attr("data-item-slug", ())))
            .flat_map(|n| FilmExtractor::extract_poster_film(&n))
        {
            if !films.iter().any(|f| f.slug == film.slug) {
                films.push(film);
            }
        }

        films
    }

    fn extract_poster_film(poster: &Node) -> Option<PosterFilm> {
        let slug = poster
            .attr("data-film-slug")
            .or(poster.attr("data-item-slug"))?
            .to_string();

        let (name, name_year) = poster
            .attr("data-film-name")
            .or(poster.attr("data-item-name"))
            .map(split_name_and_year)
            .unwrap_or_default();

        let title = if name.is_empty() {
            poster
                .find(Name("img"))
                .flat_map(|n| n.attr("alt"))
                .map(|alt| alt.trim().to_string())
                .next()?
        } else {
            name
        };

        let year = poster
            .attr("data-film-release-year")
            .and_then(|y| y.parse::<i32>().ok())
            .or(name_year);

        Some(PosterFilm { slug, title, year })
    }

    pub fn extract_list_title(list_page_html: &str) -> Option<String> {
        let document = Document::from(list_page_html);
        document
            .find(And(Name("h1"), Class("title-1")))
            .map(|n| n.text().trim().to_string())
            .find(|t| !t.is_empty())
            .or_else(|| {
                FilmExtractor::meta_content(&document, "property", "og:title")
            })
    }

    pub fn extract_user_profile(profile_page_html: &str, username: &str) -> UserProfile {
        let document = Document::from(profile_page_html);

        let display_name = document
            .find(Class("displayname"))
            .map(|n| n.text().trim().to_string())
            .find(|name| !name.is_empty())
            .or_else(|| {
                FilmExtractor::meta_content(&document, "property", "og:title").map(|title| {
                    title
                        .trim_end_matches("’s profile")
                        .trim_end_matches("'s profile")
                        .to_string()
                })
            })
            .unwrap_or_else(|| username.to_string());

        UserProfile {
            username: username.to_string(),
            display_name,
            watched_count: FilmExtractor::profile_count(&document, username, "films"),
            watchlist_count: FilmExtractor::profile_count(&document, username, "watchlist"),
            likes_count: FilmExtractor::profile_count(&document, username, "likes"),
            lists_count: FilmExtractor::profile_count(&document, username, "lists"),
        }
    }

    /// The counter shown inside the first `/{user}/{section}/` link that has one.
    fn profile_count(document: &Document, username: &str, section: &str) -> Option<u32> {
        let href = format!("/{}/{}/", username, section);
        document
            .find(Name("a"))
            .filter(|n| {
                n.attr("href")
                    .map_or(false, |h| h.eq_ignore_ascii_case(&href))
            })
            .flat_map(|n| n.find(Class("value")).next())
            .flat_map(|value| {
                value.text().trim().replace(',', "").parse::<u32>().ok()
            })
            .next()
    }

    pub fn extract_diary_entries(diary_page_html: &str) -> Vec<DiaryEntry> {
        Document::from(diary_page_html)
            .find(And(Name("tr"), Class("diary-entry-row")))
            .flat_map(|row| FilmExtractor::extract_diary_entry(&row))
            .collect()
    }

    fn extract_diary_entry(row: &Node) -> Option<DiaryEntry> {
        let poster = row
            .find(Or(Attr("data-film-slug", ()), Attr("data-item-slug", ())))
            .next();
        let film_link = row.find(Descendant(Name("h3"), Name("a"))).next();

        let slug = poster
            .as_ref()
            .and_then(|p| p.attr("data-film-slug").or(p.attr("data-item-slug")))
            .map(|s| s.to_string())
            .or_else(|| {
                film_link
                    .and_then(|n| n.attr("href"))
                    .and_then(slug_from_film_href)
            })?;

        let (name, name_year) = poster
            .as_ref()
            .and_then(|p| p.attr("data-item-name").or(p.attr("data-film-name")))
            .map(split_name_and_year)
            .unwrap_or_default();

        let title = film_link
            .map(|n| n.text().trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or(name);

        let year = row
            .find(Class("td-released"))
            .flat_map(|n| n.text().trim().parse::<i32>().ok())
            .next()
            .or(name_year);

        let watched_date = row
            .find(Name("a"))
            .flat_map(|n| n.attr("href"))
            .flat_map(watched_date_from_href)
            .next();

        let rating = row
            .find(And(Name("span"), Class("rating")))
            .flat_map(|n| n.attr("class"))
            .flat_map(|classes| classes.split_whitespace().find_map(half_stars))
            .next();

        Some(DiaryEntry {
            slug,
            title,
            year,
            tmdb_link: None,
            watched_date,
            rating,
        })
    }

    pub fn get_last_page_from_html(page_html: &str) -> Option<u32> {
        Document::from(page_html)
            .find(Name("a"))
            .flat_map(|n| n.attr("href"))
            .flat_map(|link| {
                let page_num_str = link.split("/page/").nth(1)?;
                page_num_str.trim_end_matches('/').parse::<u32>().ok()
            })
            .max()
    }
}

fn href_starts_with(node: &Node, prefix: &str) -> bool {
    node.attr("href").map_or(false, |h| h.starts_with(prefix))
}

fn is_year_link(node: &Node) -> bool {
    href_starts_with(node, "/films/year/")
}

/// Works for both `/film/{slug}/` and a member's `/{user}/film/{slug}/`.
fn slug_from_film_href(href: &str) -> Option<String> {
    let (_, rest) = href.split_once("/film/")?;
    let slug = rest.split('/').next()?;
    if slug.is_empty() {
        None
    } else {
        Some(slug.to_string())
    }
}

/// `/{user}/films/diary/for/2026/03/15/` becomes `2026-03-15`.
fn watched_date_from_href(href: &str) -> Option<String> {
    let (_, rest) = href.split_once("/films/diary/for/")?;
    let parts: Vec<&str> = rest.trim_end_matches('/').split('/').collect();
    match parts.as_slice() {
        [year, month, day] if parts.iter().all(|p| p.chars().all(|c| c.is_ascii_digit())) => {
            Some(format!("{}-{}-{}", year, month, day))
        }
        _ => None,
    }
}

/// Diary ratings are marked with a `rated-N` class, N counted in half stars.
fn half_stars(class: &str) -> Option<Rating> {
    let halves = class.strip_prefix("rated-")?.parse::<u8>().ok()?;
    Rating::new(f64::from(halves) / 2.0)
}

/// Splits `"Casablanca (1942)"` into its name and year.
fn split_name_and_year(name: &str) -> (String, Option<i32>) {
    let name = name.trim();
    if let Some(open) = name.rfind(" (") {
        let inside = &name[open + 2..];
        if let Some(year) = inside
            .strip_suffix(')')
            .filter(|y| y.len() == 4)
            .and_then(|y| y.parse::<i32>().ok())
        {
            return (name[..open].trim().to_string(), Some(year));
        }
    }
    (name.to_string(), None)
}

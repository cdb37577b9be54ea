use serde::Serialize;

use crate::models::Rating;

/// Returned when no genre can be inferred
pub const UNKNOWN_GENRE: &str = "Unknown";

/// Mean score of one genre across the collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreAverage {
    pub genre: String,
    pub mean: f64,
    pub count: usize,
}

/// Per-genre mean scores, in the order each genre is first seen
///
/// Walks the collection in insertion order and each rating's genres in their listed order.
pub fn genre_averages(ratings: &[Rating]) -> Vec<GenreAverage> {
    let mut groups: Vec<(String, f64, usize)> = Vec::new();

    for rating in ratings {
        for genre in &rating.genres {
            match groups.iter_mut().find(|(name, _, _)| name == genre) {
                Some((_, sum, count)) => {
                    *sum += rating.score;
                    *count += 1;
                }
                None => groups.push((genre.clone(), rating.score, 1)),
            }
        }
    }

    groups
        .into_iter()
        .map(|(genre, sum, count)| GenreAverage {
            genre,
            mean: sum / count as f64,
            count,
        })
        .collect()
}

/// Genre with the highest mean score
///
/// Ties go to the genre seen first. Returns `None` when no rating carries a genre.
pub fn top_genre(ratings: &[Rating]) -> Option<GenreAverage> {
    genre_averages(ratings)
        .into_iter()
        .fold(None, |best: Option<GenreAverage>, candidate| match best {
            Some(b) if candidate.mean <= b.mean => Some(b),
            _ => Some(candidate),
        })
}

/// Favorite genre name, or [`UNKNOWN_GENRE`]
pub fn favorite_genre(ratings: &[Rating]) -> String {
    top_genre(ratings)
        .map(|g| g.genre)
        .unwrap_or_else(|| UNKNOWN_GENRE.to_string())
}

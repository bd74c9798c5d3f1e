use super::{release_date, require_text};
use crate::db::RepositoryError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Movie record with the ids of the actors cast in it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub release_date: NaiveDateTime,
    pub actors: Vec<i64>,
}

/// Body of `POST /movies`
#[derive(Debug, Clone, Deserialize)]
pub struct NewMovie {
    pub title: String,
    #[serde(deserialize_with = "release_date::deserialize")]
    pub release_date: NaiveDateTime,
    /// Ids of existing actors to cast in the movie
    #[serde(default)]
    pub actors: Vec<i64>,
}

impl NewMovie {
    pub fn validate(&self) -> Result<(), RepositoryError> {
        require_text("title", &self.title)
    }
}

/// Body of `PATCH /movies/{id}`; `actors`, when present, replaces the cast
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MoviePatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "release_date::deserialize_option")]
    pub release_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub actors: Option<Vec<i64>>,
}

impl MoviePatch {
    pub fn validate(&self) -> Result<(), RepositoryError> {
        match &self.title {
            Some(title) => require_text("title", title),
            None => Ok(()),
        }
    }
}

/// Sorted, duplicate-free copy of a cast list
pub(crate) fn normalize_cast(ids: &[i64]) -> Vec<i64> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_movie_parses_plain_date() {
        let movie: NewMovie = serde_json::from_value(json!({
            "title": "Heat",
            "release_date": "1995-12-15"
        }))
        .unwrap();
        assert_eq!(movie.release_date.to_string(), "1995-12-15 00:00:00");
        assert!(movie.actors.is_empty());
    }

    #[test]
    fn test_new_movie_rejects_bad_date() {
        let result = serde_json::from_value::<NewMovie>(json!({
            "title": "Heat",
            "release_date": "sometime"
        }));
        assert!(result.unwrap_err().is_data());
    }

    #[test]
    fn test_patch_without_date_leaves_it_unset() {
        let patch: MoviePatch = serde_json::from_value(json!({ "title": "Ronin" })).unwrap();
        assert_eq!(patch.release_date, None);
        assert_eq!(patch.actors, None);
    }

    #[test]
    fn test_blank_title_is_invalid() {
        let patch = MoviePatch {
            title: Some(" ".to_string()),
            ..MoviePatch::default()
        };
        assert!(matches!(patch.validate(), Err(RepositoryError::InvalidInput(_))));
    }

    #[test]
    fn test_normalize_cast() {
        assert_eq!(normalize_cast(&[3, 1, 3, 2]), vec![1, 2, 3]);
    }
}

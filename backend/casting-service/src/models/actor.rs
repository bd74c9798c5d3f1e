use super::{nullable, require_text};
use crate::db::RepositoryError;
use serde::{Deserialize, Serialize};

/// Actor record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Actor {
    pub id: i64,
    pub name: String,
    pub age: Option<i32>,
    pub gender: String,
    /// Movie this actor is cast in, if any
    pub movie_id: Option<i64>,
}

/// Body of `POST /actors`
#[derive(Debug, Clone, Deserialize)]
pub struct NewActor {
    pub name: String,
    #[serde(default)]
    pub age: Option<i32>,
    pub gender: String,
    #[serde(default, alias = "movies_id")]
    pub movie_id: Option<i64>,
}

impl NewActor {
    pub fn validate(&self) -> Result<(), RepositoryError> {
        require_text("name", &self.name)?;
        require_text("gender", &self.gender)?;
        validate_age(self.age)
    }
}

/// Body of `PATCH /actors/{id}`; absent fields are left unchanged and an
/// explicit `null` clears `age` or `movie_id`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActorPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub age: Option<Option<i32>>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default, alias = "movies_id", deserialize_with = "nullable")]
    pub movie_id: Option<Option<i64>>,
}

impl ActorPatch {
    pub fn validate(&self) -> Result<(), RepositoryError> {
        if let Some(name) = &self.name {
            require_text("name", name)?;
        }
        if let Some(gender) = &self.gender {
            require_text("gender", gender)?;
        }
        validate_age(self.age.flatten())
    }

    /// Movie the patch casts the actor in, if it names one
    pub fn target_movie(&self) -> Option<i64> {
        self.movie_id.flatten()
    }

    pub fn apply(self, actor: &mut Actor) {
        if let Some(name) = self.name {
            actor.name = name;
        }
        if let Some(age) = self.age {
            actor.age = age;
        }
        if let Some(gender) = self.gender {
            actor.gender = gender;
        }
        if let Some(movie_id) = self.movie_id {
            actor.movie_id = movie_id;
        }
    }
}

fn validate_age(age: Option<i32>) -> Result<(), RepositoryError> {
    match age {
        Some(age) if age < 0 => Err(RepositoryError::InvalidInput(
            "age must not be negative".to_string(),
        )),
        _ => Ok(()),
    }
}

//! In-memory storage backend
//!
//! Holds both tables behind a single lock so every operation sees and
//! leaves a consistent state.

use super::{ActorRepository, MovieRepository, RepositoryError, Result};
use crate::models::movie::normalize_cast;
use crate::models::{Actor, ActorPatch, Movie, MoviePatch, NewActor, NewMovie};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct MovieRow {
    title: String,
    release_date: NaiveDateTime,
}

#[derive(Debug, Default)]
struct Tables {
    actors: BTreeMap<i64, Actor>,
    movies: BTreeMap<i64, MovieRow>,
    last_actor_id: i64,
    last_movie_id: i64,
}

impl Tables {
    fn movie(&self, id: i64) -> Option<Movie> {
        self.movies.get(&id).map(|row| Movie {
            id,
            title: row.title.clone(),
            release_date: row.release_date,
            actors: self
                .actors
                .values()
                .filter(|actor| actor.movie_id == Some(id))
                .map(|actor| actor.id)
                .collect(),
        })
    }

    fn ensure_movie(&self, id: Option<i64>) -> Result<()> {
        match id {
            Some(id) if !self.movies.contains_key(&id) => Err(RepositoryError::UnknownMovie(id)),
            _ => Ok(()),
        }
    }

    fn ensure_actors(&self, ids: &[i64]) -> Result<()> {
        match ids.iter().find(|id| !self.actors.contains_key(*id)) {
            Some(missing) => Err(RepositoryError::UnknownActor(*missing)),
            None => Ok(()),
        }
    }

    fn ensure_unique_title(&self, title: &str, except: Option<i64>) -> Result<()> {
        let taken = self
            .movies
            .iter()
            .any(|(id, row)| Some(*id) != except && row.title == title);
        if taken {
            return Err(RepositoryError::DuplicateTitle(title.to_string()));
        }
        Ok(())
    }

    /// Make `cast` exactly the set of actors referencing `movie_id`
    fn recast(&mut self, movie_id: i64, cast: &[i64]) {
        for actor in self.actors.values_mut() {
            if cast.contains(&actor.id) {
                actor.movie_id = Some(movie_id);
            } else if actor.movie_id == Some(movie_id) {
                actor.movie_id = None;
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ActorRepository for MemoryStore {
    async fn list(&self) -> Result<Vec<Actor>> {
        Ok(self.tables.read().await.actors.values().cloned().collect())
    }

    async fn find(&self, id: i64) -> Result<Option<Actor>> {
        Ok(self.tables.read().await.actors.get(&id).cloned())
    }

    async fn create(&self, actor: NewActor) -> Result<Actor> {
        actor.validate()?;
        let mut tables = self.tables.write().await;
        tables.ensure_movie(actor.movie_id)?;

        tables.last_actor_id += 1;
        let record = Actor {
            id: tables.last_actor_id,
            name: actor.name,
            age: actor.age,
            gender: actor.gender,
            movie_id: actor.movie_id,
        };
        tables.actors.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update(&self, id: i64, patch: ActorPatch) -> Result<Option<Actor>> {
        patch.validate()?;
        let mut tables = self.tables.write().await;
        if !tables.actors.contains_key(&id) {
            return Ok(None);
        }
        tables.ensure_movie(patch.target_movie())?;

        Ok(tables.actors.get_mut(&id).map(|actor| {
            patch.apply(actor);
            actor.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        Ok(self.tables.write().await.actors.remove(&id).is_some())
    }
}

#[async_trait]
impl MovieRepository for MemoryStore {
    async fn list(&self) -> Result<Vec<Movie>> {
        let tables = self.tables.read().await;
        Ok(tables.movies.keys().filter_map(|id| tables.movie(*id)).collect())
    }

    async fn find(&self, id: i64) -> Result<Option<Movie>> {
        Ok(self.tables.read().await.movie(id))
    }

    async fn create(&self, movie: NewMovie) -> Result<Movie> {
        movie.validate()?;
        let cast = normalize_cast(&movie.actors);
        let mut tables = self.tables.write().await;
        tables.ensure_unique_title(&movie.title, None)?;
        tables.ensure_actors(&cast)?;

        tables.last_movie_id += 1;
        let id = tables.last_movie_id;
        tables.movies.insert(
            id,
            MovieRow {
                title: movie.title,
                release_date: movie.release_date,
            },
        );
        tables.recast(id, &cast);

        tables
            .movie(id)
            .ok_or_else(|| RepositoryError::UnknownMovie(id))
    }

    async fn update(&self, id: i64, patch: MoviePatch) -> Result<Option<Movie>> {
        patch.validate()?;
        let mut tables = self.tables.write().await;
        if !tables.movies.contains_key(&id) {
            return Ok(None);
        }
        if let Some(title) = &patch.title {
            tables.ensure_unique_title(title, Some(id))?;
        }
        let cast = patch.actors.as_deref().map(normalize_cast);
        if let Some(cast) = &cast {
            tables.ensure_actors(cast)?;
        }

        if let Some(row) = tables.movies.get_mut(&id) {
            if let Some(title) = patch.title {
                row.title = title;
            }
            if let Some(release_date) = patch.release_date {
                row.release_date = release_date;
            }
        }
        if let Some(cast) = cast {
            tables.recast(id, &cast);
        }

        Ok(tables.movie(id))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if tables.movies.remove(&id).is_none() {
            return Ok(false);
        }
        tables.recast(id, &[]);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn new_actor(name: &str, movie_id: Option<i64>) -> NewActor {
        NewActor {
            name: name.to_string(),
            age: Some(30),
            gender: "F".to_string(),
            movie_id,
        }
    }

    fn new_movie(title: &str, actors: Vec<i64>) -> NewMovie {
        NewMovie {
            title: title.to_string(),
            release_date: NaiveDate::from_ymd_opt(1995, 12, 15)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .unwrap(),
            actors,
        }
    }

    #[tokio::test]
    async fn test_created_actor_is_listed() {
        let store = MemoryStore::new();
        let actor = ActorRepository::create(&store, new_actor("A", None)).await.unwrap();
        assert_eq!(actor.id, 1);

        let actors = ActorRepository::list(&store).await.unwrap();
        assert_eq!(actors, vec![actor]);
    }

    #[tokio::test]
    async fn test_actor_with_unknown_movie_is_rejected() {
        let store = MemoryStore::new();
        let err = ActorRepository::create(&store, new_actor("A", Some(9)))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::UnknownMovie(9)));
        assert!(ActorRepository::list(&store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_actor_is_none() {
        let store = MemoryStore::new();
        let updated = ActorRepository::update(&store, 42, ActorPatch::default())
            .await
            .unwrap();
        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn test_movie_casts_existing_actors() {
        let store = MemoryStore::new();
        let a = ActorRepository::create(&store, new_actor("A", None)).await.unwrap();
        let b = ActorRepository::create(&store, new_actor("B", None)).await.unwrap();

        let movie = MovieRepository::create(&store, new_movie("Heat", vec![b.id, a.id, b.id]))
            .await
            .unwrap();
        assert_eq!(movie.actors, vec![a.id, b.id]);

        let a = ActorRepository::find(&store, a.id).await.unwrap().unwrap();
        assert_eq!(a.movie_id, Some(movie.id));
    }

    #[tokio::test]
    async fn test_unknown_cast_member_leaves_no_movie() {
        let store = MemoryStore::new();
        let err = MovieRepository::create(&store, new_movie("Heat", vec![7]))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::UnknownActor(7)));
        assert!(MovieRepository::list(&store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_title_is_rejected() {
        let store = MemoryStore::new();
        MovieRepository::create(&store, new_movie("Heat", vec![])).await.unwrap();
        let err = MovieRepository::create(&store, new_movie("Heat", vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::DuplicateTitle(_)));
    }

    #[tokio::test]
    async fn test_renaming_to_own_title_is_allowed() {
        let store = MemoryStore::new();
        let movie = MovieRepository::create(&store, new_movie("Heat", vec![])).await.unwrap();
        let patch = MoviePatch {
            title: Some("Heat".to_string()),
            ..MoviePatch::default()
        };
        let updated = MovieRepository::update(&store, movie.id, patch).await.unwrap();
        assert_eq!(updated.map(|m| m.title), Some("Heat".to_string()));
    }

    #[tokio::test]
    async fn test_patch_actors_replaces_cast() {
        let store = MemoryStore::new();
        let a = ActorRepository::create(&store, new_actor("A", None)).await.unwrap();
        let b = ActorRepository::create(&store, new_actor("B", None)).await.unwrap();
        let movie = MovieRepository::create(&store, new_movie("Heat", vec![a.id]))
            .await
            .unwrap();

        let patch = MoviePatch {
            actors: Some(vec![b.id]),
            ..MoviePatch::default()
        };
        let updated = MovieRepository::update(&store, movie.id, patch)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.actors, vec![b.id]);

        let a = ActorRepository::find(&store, a.id).await.unwrap().unwrap();
        assert_eq!(a.movie_id, None);
    }

    #[tokio::test]
    async fn test_deleting_movie_keeps_its_actors() {
        let store = MemoryStore::new();
        let movie = MovieRepository::create(&store, new_movie("Heat", vec![])).await.unwrap();
        let actor = ActorRepository::create(&store, new_actor("A", Some(movie.id)))
            .await
            .unwrap();

        assert!(MovieRepository::delete(&store, movie.id).await.unwrap());
        assert!(!MovieRepository::delete(&store, movie.id).await.unwrap());

        let actors = ActorRepository::list(&store).await.unwrap();
        assert_eq!(actors.len(), 1);
        assert_eq!(actors[0].id, actor.id);
        assert_eq!(actors[0].movie_id, None);
    }

    #[tokio::test]
    async fn test_null_patch_uncasts_actor() {
        let store = MemoryStore::new();
        let movie = MovieRepository::create(&store, new_movie("Heat", vec![])).await.unwrap();
        let actor = ActorRepository::create(&store, new_actor("A", Some(movie.id)))
            .await
            .unwrap();

        let patch = ActorPatch {
            movie_id: Some(None),
            ..ActorPatch::default()
        };
        let updated = ActorRepository::update(&store, actor.id, patch)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.movie_id, None);
        assert_eq!(updated.age, Some(30));

        let movie = MovieRepository::find(&store, movie.id).await.unwrap().unwrap();
        assert!(movie.actors.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_input_writes_nothing() {
        let store = MemoryStore::new();
        let err = ActorRepository::create(&store, new_actor("", None))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidInput(_)));
        assert!(ActorRepository::list(&store).await.unwrap().is_empty());
    }
}

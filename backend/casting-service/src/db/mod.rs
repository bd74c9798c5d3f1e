/// Database access layer
///
/// Repository traits for actors and movies with a PostgreSQL implementation
/// and an in-memory one. Every call is atomic: it either applies completely
/// or leaves storage untouched.
pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::{PgActorRepository, PgMovieRepository};

use crate::models::{Actor, ActorPatch, Movie, MoviePatch, NewActor, NewMovie};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("a movie titled '{0}' already exists")]
    DuplicateTitle(String),

    #[error("movie {0} does not exist")]
    UnknownMovie(i64),

    #[error("actor {0} does not exist")]
    UnknownActor(i64),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;

#[async_trait]
pub trait ActorRepository: Send + Sync {
    /// All actors ordered by id
    async fn list(&self) -> Result<Vec<Actor>>;

    async fn find(&self, id: i64) -> Result<Option<Actor>>;

    async fn create(&self, actor: NewActor) -> Result<Actor>;

    /// `Ok(None)` when no actor has this id
    async fn update(&self, id: i64, patch: ActorPatch) -> Result<Option<Actor>>;

    /// `Ok(false)` when no actor has this id
    async fn delete(&self, id: i64) -> Result<bool>;
}

#[async_trait]
pub trait MovieRepository: Send + Sync {
    /// All movies ordered by id
    async fn list(&self) -> Result<Vec<Movie>>;

    async fn find(&self, id: i64) -> Result<Option<Movie>>;

    async fn create(&self, movie: NewMovie) -> Result<Movie>;

    async fn update(&self, id: i64, patch: MoviePatch) -> Result<Option<Movie>>;

    /// Actors cast in the movie lose their reference and are kept
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// Storage handles owned by the composition root
#[derive(Clone)]
pub struct Repositories {
    pub actors: Arc<dyn ActorRepository>,
    pub movies: Arc<dyn MovieRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            actors: Arc::new(PgActorRepository::new(pool.clone())),
            movies: Arc::new(PgMovieRepository::new(pool)),
        }
    }

    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            actors: store.clone(),
            movies: store,
        }
    }
}

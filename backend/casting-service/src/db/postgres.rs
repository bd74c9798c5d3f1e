use super::{ActorRepository, MovieRepository, RepositoryError, Result};
use crate::models::movie::normalize_cast;
use crate::models::{Actor, ActorPatch, Movie, MoviePatch, NewActor, NewMovie};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{PgConnection, PgPool};
use std::collections::HashMap;
use tracing::debug;

const TITLE_UNIQUE: &str = "movies_title_key";
const ACTOR_MOVIE_FK: &str = "actors_movie_id_fkey";

#[derive(Debug, sqlx::FromRow)]
struct MovieRecord {
    id: i64,
    title: String,
    release_date: NaiveDateTime,
}

impl MovieRecord {
    fn with_cast(self, actors: Vec<i64>) -> Movie {
        Movie {
            id: self.id,
            title: self.title,
            release_date: self.release_date,
            actors,
        }
    }
}

fn violated_constraint(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db_err) => db_err.constraint(),
        _ => None,
    }
}

fn actor_error(err: sqlx::Error, movie_id: Option<i64>) -> RepositoryError {
    match (violated_constraint(&err), movie_id) {
        (Some(ACTOR_MOVIE_FK), Some(movie_id)) => RepositoryError::UnknownMovie(movie_id),
        _ => RepositoryError::Database(err),
    }
}

fn movie_error(err: sqlx::Error, title: Option<&str>) -> RepositoryError {
    match (violated_constraint(&err), title) {
        (Some(TITLE_UNIQUE), Some(title)) => RepositoryError::DuplicateTitle(title.to_string()),
        _ => RepositoryError::Database(err),
    }
}

/// Actor repository backed by PostgreSQL
#[derive(Clone)]
pub struct PgActorRepository {
    pool: PgPool,
}

impl PgActorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActorRepository for PgActorRepository {
    async fn list(&self) -> Result<Vec<Actor>> {
        let actors = sqlx::query_as::<_, Actor>(
            "SELECT id, name, age, gender, movie_id FROM actors ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(actors)
    }

    async fn find(&self, id: i64) -> Result<Option<Actor>> {
        let actor = sqlx::query_as::<_, Actor>(
            "SELECT id, name, age, gender, movie_id FROM actors WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(actor)
    }

    async fn create(&self, actor: NewActor) -> Result<Actor> {
        actor.validate()?;
        sqlx::query_as::<_, Actor>(
            r#"
            INSERT INTO actors (name, age, gender, movie_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, age, gender, movie_id
            "#,
        )
        .bind(&actor.name)
        .bind(actor.age)
        .bind(&actor.gender)
        .bind(actor.movie_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| actor_error(e, actor.movie_id))
    }

    async fn update(&self, id: i64, patch: ActorPatch) -> Result<Option<Actor>> {
        patch.validate()?;
        sqlx::query_as::<_, Actor>(
            r#"
            UPDATE actors
            SET name = COALESCE($2, name),
                age = CASE WHEN $3 THEN $4 ELSE age END,
                gender = COALESCE($5, gender),
                movie_id = CASE WHEN $6 THEN $7 ELSE movie_id END
            WHERE id = $1
            RETURNING id, name, age, gender, movie_id
            "#,
        )
        .bind(id)
        .bind(patch.name.as_deref())
        .bind(patch.age.is_some())
        .bind(patch.age.flatten())
        .bind(patch.gender.as_deref())
        .bind(patch.movie_id.is_some())
        .bind(patch.target_movie())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| actor_error(e, patch.target_movie()))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM actors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Movie repository backed by PostgreSQL
#[derive(Clone)]
pub struct PgMovieRepository {
    pool: PgPool,
}

impl PgMovieRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn cast_of(conn: &mut PgConnection, movie_id: i64) -> Result<Vec<i64>> {
    let ids = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM actors WHERE movie_id = $1 ORDER BY id",
    )
    .bind(movie_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(ids)
}

/// Make `cast` exactly the set of actors referencing `movie_id`
async fn recast(conn: &mut PgConnection, movie_id: i64, cast: &[i64]) -> Result<()> {
    let found = sqlx::query_scalar::<_, i64>("SELECT id FROM actors WHERE id = ANY($1)")
        .bind(cast)
        .fetch_all(&mut *conn)
        .await?;
    if let Some(missing) = cast.iter().find(|id| !found.contains(*id)) {
        return Err(RepositoryError::UnknownActor(*missing));
    }

    sqlx::query("UPDATE actors SET movie_id = NULL WHERE movie_id = $1 AND NOT (id = ANY($2))")
        .bind(movie_id)
        .bind(cast)
        .execute(&mut *conn)
        .await?;
    sqlx::query("UPDATE actors SET movie_id = $1 WHERE id = ANY($2)")
        .bind(movie_id)
        .bind(cast)
        .execute(&mut *conn)
        .await?;

    debug!(movie_id, cast_size = cast.len(), "Movie cast replaced");
    Ok(())
}

#[async_trait]
impl MovieRepository for PgMovieRepository {
    async fn list(&self) -> Result<Vec<Movie>> {
        let movies = sqlx::query_as::<_, MovieRecord>(
            "SELECT id, title, release_date FROM movies ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        let links = sqlx::query_as::<_, (i64, i64)>(
            "SELECT movie_id, id FROM actors WHERE movie_id IS NOT NULL ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut casts: HashMap<i64, Vec<i64>> = HashMap::new();
        for (movie_id, actor_id) in links {
            casts.entry(movie_id).or_default().push(actor_id);
        }

        Ok(movies
            .into_iter()
            .map(|record| {
                let cast = casts.remove(&record.id).unwrap_or_default();
                record.with_cast(cast)
            })
            .collect())
    }

    async fn find(&self, id: i64) -> Result<Option<Movie>> {
        let mut conn = self.pool.acquire().await?;
        let record = sqlx::query_as::<_, MovieRecord>(
            "SELECT id, title, release_date FROM movies WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        match record {
            Some(record) => {
                let cast = cast_of(&mut conn, id).await?;
                Ok(Some(record.with_cast(cast)))
            }
            None => Ok(None),
        }
    }

    async fn create(&self, movie: NewMovie) -> Result<Movie> {
        movie.validate()?;
        let cast = normalize_cast(&movie.actors);
        let mut tx = self.pool.begin().await?;

        let record = sqlx::query_as::<_, MovieRecord>(
            r#"
            INSERT INTO movies (title, release_date)
            VALUES ($1, $2)
            RETURNING id, title, release_date
            "#,
        )
        .bind(&movie.title)
        .bind(movie.release_date)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| movie_error(e, Some(&movie.title)))?;

        if !cast.is_empty() {
            recast(&mut tx, record.id, &cast).await?;
        }
        tx.commit().await?;

        Ok(record.with_cast(cast))
    }

    async fn update(&self, id: i64, patch: MoviePatch) -> Result<Option<Movie>> {
        patch.validate()?;
        let mut tx = self.pool.begin().await?;

        let record = sqlx::query_as::<_, MovieRecord>(
            r#"
            UPDATE movies
            SET title = COALESCE($2, title),
                release_date = COALESCE($3, release_date)
            WHERE id = $1
            RETURNING id, title, release_date
            "#,
        )
        .bind(id)
        .bind(patch.title.as_deref())
        .bind(patch.release_date)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| movie_error(e, patch.title.as_deref()))?;

        let Some(record) = record else {
            return Ok(None);
        };

        if let Some(actors) = &patch.actors {
            recast(&mut tx, id, &normalize_cast(actors)).await?;
        }
        let cast = cast_of(&mut tx, id).await?;
        tx.commit().await?;

        Ok(Some(record.with_cast(cast)))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        // actors.movie_id is cleared by ON DELETE SET NULL
        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

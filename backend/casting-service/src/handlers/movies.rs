/// Movie handlers - HTTP endpoints for movie operations
use crate::db::MovieRepository;
use crate::error::{ApiError, Result};
use crate::models::{MoviePatch, NewMovie};
use super::decode_body;
use actix_middleware::VerifiedClaims;
use actix_web::{web, HttpResponse};
use serde_json::json;

/// List all movies with their cast
pub async fn list_movies(
    _claims: VerifiedClaims,
    repo: web::Data<dyn MovieRepository>,
) -> Result<HttpResponse> {
    let movies = repo.list().await?;
    if movies.is_empty() {
        return Err(ApiError::NotFound);
    }

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "movies": movies,
    })))
}

/// Create a new movie
pub async fn create_movie(
    claims: VerifiedClaims,
    repo: web::Data<dyn MovieRepository>,
    body: web::Json<NewMovie>,
) -> Result<HttpResponse> {
    let movie = repo.create(body.into_inner()).await?;
    tracing::info!(
        movie_id = movie.id,
        cast_size = movie.actors.len(),
        subject = claims.0.subject().unwrap_or("unknown"),
        "Movie created"
    );

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "movie": movie.title,
    })))
}

/// Patch an existing movie; an absent id is 404 before the body is decoded
pub async fn update_movie(
    claims: VerifiedClaims,
    repo: web::Data<dyn MovieRepository>,
    movie_id: web::Path<i64>,
    body: web::Bytes,
) -> Result<HttpResponse> {
    let movie_id = movie_id.into_inner();
    if repo.find(movie_id).await?.is_none() {
        return Err(ApiError::NotFound);
    }
    let patch: MoviePatch = decode_body(&body)?;
    let movie = repo
        .update(movie_id, patch)
        .await?
        .ok_or(ApiError::NotFound)?;
    tracing::info!(
        movie_id,
        subject = claims.0.subject().unwrap_or("unknown"),
        "Movie updated"
    );

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "movie": movie.title,
    })))
}

/// Delete a movie; its actors stay, uncast
pub async fn delete_movie(
    claims: VerifiedClaims,
    repo: web::Data<dyn MovieRepository>,
    movie_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let movie_id = movie_id.into_inner();
    if !repo.delete(movie_id).await? {
        return Err(ApiError::NotFound);
    }
    tracing::info!(
        movie_id,
        subject = claims.0.subject().unwrap_or("unknown"),
        "Movie deleted"
    );

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "deleted": movie_id,
    })))
}

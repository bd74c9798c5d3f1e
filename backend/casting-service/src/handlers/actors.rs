/// Actor handlers - HTTP endpoints for actor operations
use crate::db::ActorRepository;
use crate::error::{ApiError, Result};
use crate::models::{ActorPatch, NewActor};
use super::decode_body;
use actix_middleware::VerifiedClaims;
use actix_web::{web, HttpResponse};
use serde_json::json;

/// List all actors
pub async fn list_actors(
    _claims: VerifiedClaims,
    repo: web::Data<dyn ActorRepository>,
) -> Result<HttpResponse> {
    let actors = repo.list().await?;
    if actors.is_empty() {
        return Err(ApiError::NotFound);
    }

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "actors": actors,
    })))
}

/// Create a new actor
pub async fn create_actor(
    claims: VerifiedClaims,
    repo: web::Data<dyn ActorRepository>,
    body: web::Json<NewActor>,
) -> Result<HttpResponse> {
    let actor = repo.create(body.into_inner()).await?;
    tracing::info!(
        actor_id = actor.id,
        subject = claims.0.subject().unwrap_or("unknown"),
        "Actor created"
    );

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "actor": actor.name,
    })))
}

/// Patch an existing actor
///
/// The id is resolved before the body is read, so an absent actor is 404
/// whatever the body holds.
pub async fn update_actor(
    claims: VerifiedClaims,
    repo: web::Data<dyn ActorRepository>,
    actor_id: web::Path<i64>,
    body: web::Bytes,
) -> Result<HttpResponse> {
    let actor_id = actor_id.into_inner();
    if repo.find(actor_id).await?.is_none() {
        return Err(ApiError::NotFound);
    }
    let patch: ActorPatch = decode_body(&body)?;
    let actor = repo
        .update(actor_id, patch)
        .await?
        .ok_or(ApiError::NotFound)?;
    tracing::info!(
        actor_id,
        subject = claims.0.subject().unwrap_or("unknown"),
        "Actor updated"
    );

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "actor": actor.name,
    })))
}

/// Delete an actor
pub async fn delete_actor(
    claims: VerifiedClaims,
    repo: web::Data<dyn ActorRepository>,
    actor_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let actor_id = actor_id.into_inner();
    if !repo.delete(actor_id).await? {
        return Err(ApiError::NotFound);
    }
    tracing::info!(
        actor_id,
        subject = claims.0.subject().unwrap_or("unknown"),
        "Actor deleted"
    );

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "deleted": actor_id,
    })))
}

/// Route table and request-level configuration
///
/// Every resource answers unsupported verbs with 405 and unknown paths fall
/// through to a JSON 404.
use crate::config::CorsConfig;
use crate::db::Repositories;
use crate::error::ApiError;
use crate::handlers;
use actix_cors::Cors;
use actix_middleware::RequirePermission;
use actix_web::{error::JsonPayloadError, http::header, web};
use jwks_auth::TokenVerifier;
use std::sync::Arc;

/// JSON body errors: malformed syntax is 400, well-formed but wrongly shaped is 422
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let api_error = match &err {
            JsonPayloadError::Deserialize(e) if e.is_data() => {
                ApiError::Unprocessable(e.to_string())
            }
            _ => ApiError::BadRequest(err.to_string()),
        };
        api_error.into()
    })
}

/// Non-numeric ids address nothing
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|_err, _req| ApiError::NotFound.into())
}

pub fn cors(config: &CorsConfig) -> Cors {
    let mut cors = Cors::default();
    for origin in config.allowed_origins.split(',') {
        let origin = origin.trim();
        if origin.is_empty() {
            continue;
        }
        if origin == "*" {
            cors = cors.allow_any_origin();
        } else {
            cors = cors.allowed_origin(origin);
        }
    }

    cors.allowed_methods(vec!["GET", "PATCH", "POST", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(3600)
}

pub fn configure(cfg: &mut web::ServiceConfig, repos: &Repositories, verifier: Arc<TokenVerifier>) {
    let guard = |permission: &str| RequirePermission::new(verifier.clone(), permission);

    cfg.app_data(web::Data::from(repos.actors.clone()))
        .app_data(web::Data::from(repos.movies.clone()))
        .app_data(json_config())
        .app_data(path_config())
        .service(
            web::resource("/health")
                .route(web::get().to(handlers::health))
                .default_service(web::to(handlers::method_not_allowed)),
        )
        .service(
            web::resource("/actors")
                .route(web::get().to(handlers::list_actors).wrap(guard("get:actors")))
                .route(web::post().to(handlers::create_actor).wrap(guard("post:actors")))
                .default_service(web::to(handlers::method_not_allowed)),
        )
        .service(
            web::resource("/actors/{actor_id}")
                .route(web::patch().to(handlers::update_actor).wrap(guard("patch:actors")))
                .route(web::delete().to(handlers::delete_actor).wrap(guard("delete:actors")))
                .default_service(web::to(handlers::method_not_allowed)),
        )
        .service(
            web::resource("/movies")
                .route(web::get().to(handlers::list_movies).wrap(guard("get:movies")))
                .route(web::post().to(handlers::create_movie).wrap(guard("post:movies")))
                .default_service(web::to(handlers::method_not_allowed)),
        )
        .service(
            web::resource("/movies/{movie_id}")
                .route(web::patch().to(handlers::update_movie).wrap(guard("patch:movies")))
                .route(web::delete().to(handlers::delete_movie).wrap(guard("delete:movies")))
                .default_service(web::to(handlers::method_not_allowed)),
        )
        .default_service(web::to(handlers::not_found));
}

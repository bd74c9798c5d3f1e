use crate::error_body::{error_response, AuthRejection};
use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::{header::AUTHORIZATION, StatusCode},
    Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use jwks_auth::{check_permissions, extract_bearer_token, AuthError, Claims, TokenVerifier};
use std::rc::Rc;
use std::sync::Arc;

/// Claims of a request that passed `RequirePermission`
#[derive(Debug, Clone)]
pub struct VerifiedClaims(pub Claims);

/// Run the full guard: bearer extraction, token verification, permission check
pub async fn authorize(
    verifier: &TokenVerifier,
    permission: &str,
    authorization: Option<&str>,
) -> Result<Claims, AuthError> {
    let token = extract_bearer_token(authorization)?;
    let claims = verifier.verify(token).await?;
    check_permissions(permission, &claims)?;
    Ok(claims)
}

/// Per-route guard requiring a verified token carrying `permission`
///
/// ```ignore
/// web::resource("/actors")
///     .route(web::get().to(list_actors).wrap(RequirePermission::new(verifier, "get:actors")))
/// ```
#[derive(Clone)]
pub struct RequirePermission {
    verifier: Arc<TokenVerifier>,
    permission: Rc<str>,
}

impl RequirePermission {
    pub fn new(verifier: Arc<TokenVerifier>, permission: &str) -> Self {
        Self {
            verifier,
            permission: Rc::from(permission),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequirePermission
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RequirePermissionService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequirePermissionService {
            service: Rc::new(service),
            verifier: self.verifier.clone(),
            permission: self.permission.clone(),
        }))
    }
}

pub struct RequirePermissionService<S> {
    service: Rc<S>,
    verifier: Arc<TokenVerifier>,
    permission: Rc<str>,
}

impl<S, B> Service<ServiceRequest> for RequirePermissionService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let verifier = self.verifier.clone();
        let permission = self.permission.clone();

        Box::pin(async move {
            // Non-ASCII header values count as absent
            let header = req
                .headers()
                .get(AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);
            let outcome = authorize(&verifier, &permission, header.as_deref()).await;

            match outcome {
                Ok(claims) => {
                    req.extensions_mut().insert(VerifiedClaims(claims));
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Err(err) => {
                    // Never log the token itself
                    tracing::warn!(
                        path = %req.path(),
                        permission = %permission,
                        code = err.code(),
                        "Request rejected: {}",
                        err
                    );
                    let status =
                        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::UNAUTHORIZED);
                    let response = error_response(status, err.code());
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

/// FromRequest implementation for VerifiedClaims
impl actix_web::FromRequest for VerifiedClaims {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        match req.extensions().get::<VerifiedClaims>() {
            Some(claims) => ready(Ok(claims.clone())),
            None => ready(Err(AuthRejection(AuthError::Unauthorized).into())),
        }
    }
}

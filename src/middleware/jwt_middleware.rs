/// JWT Authentication Middleware
///
/// Validates the access token from the Authorization header and injects
/// an `AuthenticatedUser` into request extensions for route handlers.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use uuid::Uuid;

use crate::auth::{extract_bearer, validate_access_token};
use crate::error::{AppError, AuthError};

/// Identity resolved from a valid access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

/// JWT middleware for protecting routes
///
/// Any failure, including a missing or malformed header, yields 401.
pub struct JwtMiddleware {
    token_secret: Rc<str>,
}

impl JwtMiddleware {
    pub fn new(token_secret: &str) -> Self {
        Self {
            token_secret: Rc::from(token_secret),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(JwtMiddlewareService {
            service: Rc::new(service),
            token_secret: self.token_secret.clone(),
        }))
    }
}

pub struct JwtMiddlewareService<S> {
    service: Rc<S>,
    token_secret: Rc<str>,
}

fn authenticate(req: &ServiceRequest, secret: &str) -> Result<AuthenticatedUser, AuthError> {
    let token = extract_bearer(req.headers())?;
    let user_id = validate_access_token(&token, secret)?;
    Ok(AuthenticatedUser { user_id })
}

impl<S, B> Service<ServiceRequest> for JwtMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match authenticate(&req, &self.token_secret) {
            Ok(user) => {
                req.extensions_mut().insert(user);
                tracing::debug!(user_id = %user.user_id, "JWT validated successfully");

                let service = self.service.clone();
                Box::pin(async move { service.call(req).await })
            }
            Err(e) => {
                tracing::warn!(path = %req.path(), reason = %e, "Access token rejected");
                Box::pin(async move { Err(AppError::unauthenticated(e).into()) })
            }
        }
    }
}

/// Session Routes
///
/// Login, access token refresh, and refresh token revocation.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::extract_bearer;
use crate::error::{AppError, ErrorContext};
use crate::routes::users::UserResponse;
use crate::session::SessionService;
use crate::validators::is_valid_email;

/// User login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response: the user plus both tokens
#[derive(Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub token: String,
    pub refresh_token: String,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub token: String,
}

/// POST /api/login
///
/// Authenticate user with email and password.
///
/// # Errors
/// - 400: Invalid email format
/// - 401: Email not found or wrong password (same body for both)
/// - 500: Internal server error
pub async fn login(
    form: web::Json<LoginRequest>,
    session: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_login");

    let email = is_valid_email(&form.email)?;
    let opened = session
        .login(&email, &form.password)
        .await
        .map_err(|e| {
            context.log_error(&e);
            e
        })?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %opened.user.id,
        "User logged in successfully"
    );

    Ok(HttpResponse::Ok().json(LoginResponse {
        user: opened.user.into(),
        token: opened.access_token,
        refresh_token: opened.refresh_token,
    }))
}

/// POST /api/refresh
///
/// Exchange the refresh token in `Authorization: Bearer <token>` for a new
/// access token. The refresh token is not rotated.
///
/// # Errors
/// - 400: Missing or malformed Authorization header
/// - 401: Unknown, revoked, or expired refresh token
pub async fn refresh(
    req: HttpRequest,
    session: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("token_refresh");

    let refresh_token = extract_bearer(req.headers())?;
    let token = session
        .refresh_access(&refresh_token)
        .await
        .map_err(|e| {
            context.log_error(&e);
            e
        })?;

    tracing::info!(request_id = %context.request_id, "Token refreshed successfully");

    Ok(HttpResponse::Ok().json(RefreshResponse { token }))
}

/// POST /api/revoke
///
/// Revoke the refresh token in `Authorization: Bearer <token>`.
///
/// # Errors
/// - 400: Missing or malformed Authorization header
/// - 401: Unknown refresh token
pub async fn revoke(
    req: HttpRequest,
    session: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("token_revoke");

    let refresh_token = extract_bearer(req.headers())?;
    session.revoke(&refresh_token).await.map_err(|e| {
        context.log_error(&e);
        e
    })?;

    tracing::info!(request_id = %context.request_id, "Refresh token revoked");

    Ok(HttpResponse::NoContent().finish())
}

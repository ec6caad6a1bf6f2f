use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::validate_new_password;
use crate::error::{AppError, ErrorContext};
use crate::middleware::AuthenticatedUser;
use crate::session::SessionService;
use crate::store::{Storage, UserRecord};
use crate::validators::is_valid_email;

#[derive(Deserialize)]
pub struct UserRequest {
    pub email: String,
    pub password: String,
}

/// Public view of a user; never includes the password hash.
#[derive(Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    pub is_chirpy_red: bool,
}

impl From<UserRecord> for UserResponse {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            created_at: user.created_at,
            updated_at: user.updated_at,
            email: user.email,
            is_chirpy_red: user.is_chirpy_red,
        }
    }
}

/// POST /api/users
///
/// # Errors
/// - 400: invalid email, empty or over-long password
/// - 409: email already registered
pub async fn create_user(
    form: web::Json<UserRequest>,
    session: web::Data<SessionService>,
    storage: web::Data<Storage>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_registration");

    let email = is_valid_email(&form.email)?;
    validate_new_password(&form.password)?;
    let hashed_password = session.hasher().hash(&form.password)?;

    let user = storage.users.create_user(&email, &hashed_password).await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user.id,
        "User registered successfully"
    );

    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// PUT /api/users
///
/// Replace the authenticated user's email and password.
pub async fn update_user(
    auth: web::ReqData<AuthenticatedUser>,
    form: web::Json<UserRequest>,
    session: web::Data<SessionService>,
    storage: web::Data<Storage>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_update").with_user_id(auth.user_id.to_string());

    let email = is_valid_email(&form.email)?;
    validate_new_password(&form.password)?;
    let hashed_password = session.hasher().hash(&form.password)?;

    let user = storage
        .users
        .update_user(auth.user_id, &email, &hashed_password)
        .await?
        .ok_or_else(|| AppError::NotFound("user".to_string()))?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = ?context.user_id,
        "User updated successfully"
    );

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::auth::extract_api_key;
use crate::configuration::AuthSettings;
use crate::error::{AppError, AuthError, ValidationError};
use crate::store::Storage;

const USER_UPGRADED_EVENT: &str = "user.upgraded";

#[derive(Deserialize)]
pub struct PolkaEvent {
    pub event: String,
    #[serde(default)]
    pub data: Option<PolkaEventData>,
}

#[derive(Deserialize)]
pub struct PolkaEventData {
    pub user_id: Uuid,
}

/// Compares SHA-256 digests so the comparison time does not depend on
/// where the keys first differ.
fn api_key_matches(presented: &str, expected: &str) -> bool {
    Sha256::digest(presented.as_bytes()) == Sha256::digest(expected.as_bytes())
}

/// POST /api/polka/webhooks
///
/// The API key is checked before the body is parsed. Events other than
/// `user.upgraded` are acknowledged and ignored.
pub async fn polka_webhook(
    req: HttpRequest,
    body: web::Bytes,
    auth: web::Data<AuthSettings>,
    storage: web::Data<Storage>,
) -> Result<HttpResponse, AppError> {
    let key = extract_api_key(req.headers()).map_err(AppError::unauthenticated)?;
    if !api_key_matches(&key, &auth.polka_key) {
        return Err(AppError::unauthenticated(AuthError::ApiKeyMismatch));
    }

    let event: PolkaEvent = serde_json::from_slice(&body)
        .map_err(|_| ValidationError::InvalidFormat("webhook body".to_string()))?;

    if event.event != USER_UPGRADED_EVENT {
        tracing::debug!(event = %event.event, "Ignoring webhook event");
        return Ok(HttpResponse::NoContent().finish());
    }

    let data = event
        .data
        .ok_or_else(|| ValidationError::EmptyField("data".to_string()))?;

    storage
        .users
        .upgrade_to_chirpy_red(data.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("user".to_string()))?;

    tracing::info!(user_id = %data.user_id, "User upgraded to Chirpy Red");

    Ok(HttpResponse::NoContent().finish())
}

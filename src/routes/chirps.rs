use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, ErrorContext, ValidationError};
use crate::middleware::AuthenticatedUser;
use crate::store::Storage;
use crate::validators::clean_chirp_body;

#[derive(Deserialize)]
pub struct ChirpRequest {
    pub body: String,
}

#[derive(Deserialize)]
pub struct ChirpsQuery {
    pub author_id: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn parse(raw: Option<&str>) -> Result<Self, ValidationError> {
        match raw {
            None | Some("") | Some("asc") => Ok(SortOrder::Asc),
            Some("desc") => Ok(SortOrder::Desc),
            Some(_) => Err(ValidationError::InvalidParameter("sort".to_string())),
        }
    }
}

fn parse_id(raw: &str, field: &str) -> Result<Uuid, ValidationError> {
    Uuid::parse_str(raw).map_err(|_| ValidationError::InvalidParameter(field.to_string()))
}

/// POST /api/chirps
pub async fn create_chirp(
    auth: web::ReqData<AuthenticatedUser>,
    form: web::Json<ChirpRequest>,
    storage: web::Data<Storage>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("chirp_create").with_user_id(auth.user_id.to_string());

    let body = clean_chirp_body(&form.body)?;
    let chirp = storage.chirps.create_chirp(&body, auth.user_id).await?;

    tracing::info!(
        request_id = %context.request_id,
        chirp_id = %chirp.id,
        "Chirp created"
    );

    Ok(HttpResponse::Created().json(chirp))
}

/// GET /api/chirps?author_id=<uuid>&sort=asc|desc
///
/// Ordered by creation time, oldest first unless `sort=desc`.
pub async fn list_chirps(
    query: web::Query<ChirpsQuery>,
    storage: web::Data<Storage>,
) -> Result<HttpResponse, AppError> {
    let author = match query.author_id.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(parse_id(raw, "author_id")?),
    };
    let order = SortOrder::parse(query.sort.as_deref())?;

    let mut chirps = storage.chirps.list_chirps(author).await?;
    if order == SortOrder::Desc {
        chirps.reverse();
    }

    Ok(HttpResponse::Ok().json(chirps))
}

/// GET /api/chirps/{chirp_id}
pub async fn get_chirp(
    path: web::Path<String>,
    storage: web::Data<Storage>,
) -> Result<HttpResponse, AppError> {
    let chirp_id = parse_id(&path, "chirp_id")?;

    let chirp = storage
        .chirps
        .get_chirp(chirp_id)
        .await?
        .ok_or_else(|| AppError::NotFound("chirp".to_string()))?;

    Ok(HttpResponse::Ok().json(chirp))
}

/// DELETE /api/chirps/{chirp_id}
///
/// Only the author may delete a chirp.
pub async fn delete_chirp(
    auth: web::ReqData<AuthenticatedUser>,
    path: web::Path<String>,
    storage: web::Data<Storage>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("chirp_delete").with_user_id(auth.user_id.to_string());
    let chirp_id = parse_id(&path, "chirp_id")?;

    let chirp = storage
        .chirps
        .get_chirp(chirp_id)
        .await?
        .ok_or_else(|| AppError::NotFound("chirp".to_string()))?;

    if chirp.user_id != auth.user_id {
        return Err(AppError::Forbidden(
            "You can only delete your own chirps".to_string(),
        ));
    }

    if !storage.chirps.delete_chirp(chirp_id).await? {
        return Err(AppError::NotFound("chirp".to_string()));
    }

    tracing::info!(
        request_id = %context.request_id,
        chirp_id = %chirp_id,
        "Chirp deleted"
    );

    Ok(HttpResponse::NoContent().finish())
}

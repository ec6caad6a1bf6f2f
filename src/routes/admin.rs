use actix_web::{web, HttpResponse};

use crate::configuration::ApplicationSettings;
use crate::error::AppError;
use crate::metrics::HitCounter;
use crate::store::Storage;

/// GET /admin/metrics
pub async fn metrics(hits: web::Data<HitCounter>) -> HttpResponse {
    let body = format!(
        "<html>\n  <body>\n    <h1>Welcome, Chirpy Admin</h1>\n    <p>Chirpy has been visited {} times!</p>\n  </body>\n</html>",
        hits.hits()
    );

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

/// POST /admin/reset
///
/// Dev only. Zeroes the hit counter and deletes every user, which cascades
/// to their chirps and refresh tokens.
pub async fn reset(
    application: web::Data<ApplicationSettings>,
    hits: web::Data<HitCounter>,
    storage: web::Data<Storage>,
) -> Result<HttpResponse, AppError> {
    if !application.is_dev() {
        return Err(AppError::Forbidden(
            "Reset is only allowed in dev environment".to_string(),
        ));
    }

    storage.users.delete_all_users().await?;
    hits.reset();

    tracing::warn!("All users deleted and hit counter reset");

    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Hits reset to 0 and database reset to initial state."))
}

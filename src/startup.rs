use actix_files as fs;
use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::net::TcpListener;

use crate::configuration::{ApplicationSettings, AuthSettings};
use crate::error::{AppError, ValidationError};
use crate::logger::RequestLogger;
use crate::metrics::{HitCounter, HitCounterMiddleware};
use crate::middleware::JwtMiddleware;
use crate::routes::{
    create_chirp, create_user, delete_chirp, get_chirp, health_check, list_chirps, login, metrics,
    polka_webhook, refresh, reset, revoke, update_user,
};
use crate::session::SessionService;
use crate::store::Storage;

/// Everything the HTTP layer shares across workers.
#[derive(Clone)]
pub struct AppState {
    pub storage: Storage,
    pub auth: AuthSettings,
    pub application: ApplicationSettings,
    pub hits: HitCounter,
}

pub fn run(listener: TcpListener, state: AppState) -> Result<Server, std::io::Error> {
    let session = web::Data::new(SessionService::new(&state.storage, &state.auth));
    let storage = web::Data::new(state.storage);
    let auth = web::Data::new(state.auth);
    let application = web::Data::new(state.application);
    let hits = web::Data::new(state.hits);

    let server = HttpServer::new(move || {
        let secret = auth.token_secret.clone();

        App::new()
            // Global middleware
            .wrap(Logger::default())
            .wrap(RequestLogger)

            // Shared state
            .app_data(session.clone())
            .app_data(storage.clone())
            .app_data(auth.clone())
            .app_data(application.clone())
            .app_data(hits.clone())
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                tracing::debug!("Rejected request body: {}", err);
                AppError::from(ValidationError::InvalidFormat("request body".to_string())).into()
            }))
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                tracing::debug!("Rejected query string: {}", err);
                AppError::from(ValidationError::InvalidParameter("query".to_string())).into()
            }))

            // Public routes
            .route("/api/healthz", web::get().to(health_check))
            .route("/api/users", web::post().to(create_user))
            .route("/api/login", web::post().to(login))
            .route("/api/refresh", web::post().to(refresh))
            .route("/api/revoke", web::post().to(revoke))
            .route("/api/chirps", web::get().to(list_chirps))
            .route("/api/chirps/{chirp_id}", web::get().to(get_chirp))
            .route("/api/polka/webhooks", web::post().to(polka_webhook))

            // Protected routes (require a valid access token)
            .route(
                "/api/users",
                web::put().to(update_user).wrap(JwtMiddleware::new(&secret)),
            )
            .route(
                "/api/chirps",
                web::post().to(create_chirp).wrap(JwtMiddleware::new(&secret)),
            )
            .route(
                "/api/chirps/{chirp_id}",
                web::delete().to(delete_chirp).wrap(JwtMiddleware::new(&secret)),
            )

            // Admin
            .route("/admin/metrics", web::get().to(metrics))
            .route("/admin/reset", web::post().to(reset))

            // Static file serving, counted
            .service(
                web::scope("/app")
                    .wrap(HitCounterMiddleware::new(hits.get_ref().clone()))
                    .service(fs::Files::new("/", "./public").index_file("index.html")),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use actix_web::web;

pub use state::{AppState, Providers};

use crate::error::ApiError;

/// Route table shared by the server binary and the integration tests.
/// Unreadable bodies and query strings answer with the same JSON error shape
/// as the handlers.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        log::warn!("Rejected request body: {}", err);
        ApiError::Validation(err.to_string()).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        ApiError::Validation(err.to_string()).into()
    }))
    .route("/health", web::get().to(routes::health::health_check))
        .service(
            web::scope("/api")
                .service(
                    web::scope("/plan")
                        .route("/generate", web::post().to(routes::plan::generate))
                        .route("/modify", web::post().to(routes::plan::modify))
                        .route("/enrich", web::post().to(routes::plan::enrich))
                        .route("/fetch", web::get().to(routes::plan::fetch))
                        .route("/save", web::post().to(routes::plan::save)),
                )
                .route("/places/photo", web::post().to(routes::places::photo))
                .route("/directions", web::post().to(routes::directions::directions))
                .route("/hotels/search", web::post().to(routes::hotels::search))
                .route("/weather", web::post().to(routes::weather::weather)),
        );
}

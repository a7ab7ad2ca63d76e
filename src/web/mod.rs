//! HTTP form surface.
//!
//! Two operations mirror the two form modes: assembling the weekly deck
//! from a roster upload, and creating one individual slide from text fields
//! plus photo/logo uploads. Both respond with the produced .pptx as an
//! attachment; the files also remain on disk under the configured
//! directories.

pub mod error;
pub mod handlers;
pub mod pages;

use actix_web::web;

pub use error::AppError;
pub use handlers::AppState;

/// Register the application routes.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::index))
        .route("/presentation", web::post().to(handlers::create_presentation))
        .route("/slide", web::post().to(handlers::create_slide));
}

mod error;
mod handlers;
mod session;

use actix_web::web;

use crate::auth::Authenticator;
use crate::domain::company::CompanyCommandHandler;

// ============================================================================
// HTTP API
// ============================================================================
//
// POST   /api/login              public
// POST   /api/companies          session
// GET    /api/companies/{id}     public
// PATCH  /api/companies/{id}     session
// DELETE /api/companies/{id}     session
//
// Bodies are read as raw bytes (capped at BODY_LIMIT) and decoded strictly
// by the domain layer. Unknown paths and methods answer with the same
// `{"error": ..}` body as every other failure.
//
// ============================================================================

pub struct AppState {
    pub commands: CompanyCommandHandler,
    pub auth: Authenticator,
    pub cookie_secure: bool,
}

/// Upper bound on request bodies. A larger body is malformed input.
pub const BODY_LIMIT: usize = 64 * 1024;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(web::PayloadConfig::new(BODY_LIMIT))
            .service(
                web::resource("/login")
                    .route(web::post().to(handlers::login))
                    .default_service(web::to(error::method_not_allowed)),
            )
            .service(
                web::resource("/companies")
                    .route(web::post().to(handlers::create_company))
                    .default_service(web::to(error::method_not_allowed)),
            )
            .service(
                web::resource("/companies/{id}")
                    .route(web::get().to(handlers::get_company))
                    .route(web::patch().to(handlers::update_company))
                    .route(web::delete().to(handlers::delete_company))
                    .default_service(web::to(error::method_not_allowed)),
            )
            .default_service(web::to(error::route_not_found)),
    );
}

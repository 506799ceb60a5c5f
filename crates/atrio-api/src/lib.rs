pub mod auth;
pub mod contacto;
pub mod error;
pub mod eventos;
pub mod extract;
pub mod galeria;
pub mod middleware;
pub mod multipart;
pub mod noticias;
pub mod stats;
pub mod token;
pub mod upload;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post, put},
};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::require_auth;

/// Assembles the `/api` router. Public reads and the contact intake bypass
/// the auth gate; every mutation and the admin-only reads sit behind it.
/// `stats_public` decides which side `/api/stats` lands on.
pub fn router(state: AppState, stats_public: bool) -> Router {
    let public_routes = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/noticias", get(noticias::list_noticias))
        .route("/noticias/{id}", get(noticias::get_noticia))
        .route("/eventos", get(eventos::list_eventos))
        .route("/eventos/{id}", get(eventos::get_evento))
        .route("/galeria", get(galeria::list_galeria))
        .route("/galeria/{id}", get(galeria::get_imagen))
        .route("/contacto", post(contacto::create_mensaje))
        .route("/health", get(health));

    let protected_routes = Router::new()
        .route("/auth/verify", get(auth::verify))
        .route("/auth/change-password", post(auth::change_password))
        .route("/noticias", post(noticias::create_noticia))
        .route(
            "/noticias/{id}",
            put(noticias::update_noticia).delete(noticias::delete_noticia),
        )
        .route("/eventos", post(eventos::create_evento))
        .route(
            "/eventos/{id}",
            put(eventos::update_evento).delete(eventos::delete_evento),
        )
        .route("/galeria", post(galeria::upload_imagen))
        .route("/galeria/multiple", post(galeria::upload_multiple))
        .route(
            "/galeria/{id}",
            put(galeria::update_imagen).delete(galeria::delete_imagen),
        )
        .route("/contacto", get(contacto::list_mensajes))
        .route(
            "/contacto/{id}",
            get(contacto::get_mensaje).delete(contacto::delete_mensaje),
        )
        .route("/contacto/{id}/read", put(contacto::mark_read))
        .route("/contacto/mark-all-read", put(contacto::mark_all_read))
        .layer(from_fn_with_state(state.clone(), require_auth));

    let stats_routes = {
        let routes = Router::new().route("/stats", get(stats::get_stats));
        if stats_public {
            routes
        } else {
            routes.layer(from_fn_with_state(state.clone(), require_auth))
        }
    };

    let api = public_routes
        .merge(protected_routes)
        .merge(stats_routes)
        .fallback(api_not_found);

    Router::new().nest("/api", api).with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn api_not_found() -> ApiError {
    ApiError::NotFound("Endpoint no encontrado".to_string())
}

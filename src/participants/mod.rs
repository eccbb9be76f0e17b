mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
mod validation;

use axum::{middleware, routing::get, Router};

use crate::{auth::AdminAuth, state::AppState};

pub use repo::{ParticipantStore, PgParticipantStore};

/// `/participants/*`, every route behind the admin gate. The list is also
/// served with a trailing slash.
pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/participants", handlers::routes())
        .route("/participants/", get(handlers::list_participants))
        .route_layer(middleware::from_extractor_with_state::<AdminAuth, _>(state))
}

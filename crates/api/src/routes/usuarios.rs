//! Route definitions for the `/usuarios` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::usuarios;
use crate::state::AppState;

/// Routes mounted at `/usuarios`. All require the `Admin` role.
///
/// ```text
/// GET    /                        -> list_users (?rol=)
/// POST   /                        -> create_user
/// POST   /eliminar                -> delete_by_email
/// PUT    /{key}                   -> update_user
/// POST   /{key}/rol               -> assign_role
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(usuarios::list_users).post(usuarios::create_user))
        .route("/eliminar", post(usuarios::delete_by_email))
        .route("/{key}", put(usuarios::update_user))
        .route("/{key}/rol", post(usuarios::assign_role))
}

//! Route definitions for the `/catalogo` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::catalogo;
use crate::state::AppState;

/// Routes mounted at `/catalogo`. All require a staff role.
///
/// ```text
/// GET    /                        -> list_templates
/// POST   /                        -> create_template
/// POST   /importar                -> import_templates (CSV body)
/// PUT    /{id}                    -> update_template
/// DELETE /{id}                    -> delete_template
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(catalogo::list_templates).post(catalogo::create_template),
        )
        .route("/importar", post(catalogo::import_templates))
        .route(
            "/{id}",
            put(catalogo::update_template).delete(catalogo::delete_template),
        )
}

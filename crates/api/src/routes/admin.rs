//! Route definitions for the `/admin` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::promocion;
use crate::state::AppState;

/// Routes mounted at `/admin`. All require the `Admin` role.
///
/// ```text
/// POST   /promocion                   -> run_promotion
/// GET    /promocion/{year}            -> get_promotion (saga log)
/// POST   /promocion/{year}/reanudar   -> resume_promotion
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/promocion", post(promocion::run_promotion))
        .route("/promocion/{year}", get(promocion::get_promotion))
        .route(
            "/promocion/{year}/reanudar",
            post(promocion::resume_promotion),
        )
}

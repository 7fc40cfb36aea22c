//! Route definitions for the `/alumnos` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::alumnos;
use crate::state::AppState;

/// Routes mounted at `/alumnos`. All require a staff role.
///
/// ```text
/// POST   /importar                -> import_students (CSV body)
/// GET    /{nivel}                 -> list_students
/// POST   /{nivel}                 -> create_student
/// GET    /{nivel}/{id}            -> get_student
/// PUT    /{nivel}/{id}            -> update_student
/// DELETE /{nivel}/{id}            -> delete_student
/// PUT    /{nivel}/{id}/proyectos  -> update_projects
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/importar", post(alumnos::import_students))
        .route(
            "/{nivel}",
            get(alumnos::list_students).post(alumnos::create_student),
        )
        .route(
            "/{nivel}/{id}",
            get(alumnos::get_student)
                .put(alumnos::update_student)
                .delete(alumnos::delete_student),
        )
        .route("/{nivel}/{id}/proyectos", put(alumnos::update_projects))
}

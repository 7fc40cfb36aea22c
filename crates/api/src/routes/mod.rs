pub mod admin;
pub mod alumnos;
pub mod auth;
pub mod catalogo;
pub mod health;
pub mod usuarios;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                 login (public)
/// /auth/me                                    current account
///
/// /usuarios                                   list, create (admin only)
/// /usuarios/eliminar                          delete by email (admin only)
/// /usuarios/{key}                             update (admin only)
/// /usuarios/{key}/rol                         assign role (admin only)
///
/// /alumnos/importar                           CSV import (staff)
/// /alumnos/{nivel}                            list, create (staff)
/// /alumnos/{nivel}/{id}                       get, update, delete (staff)
/// /alumnos/{nivel}/{id}/proyectos             replace projects (staff)
///
/// /consulta                                   search all grades (staff)
/// /egresados                                  graduate archive (staff)
///
/// /catalogo                                   list, create (staff)
/// /catalogo/importar                          CSV import (staff)
/// /catalogo/{id}                              update, delete (staff)
///
/// /admin/promocion                            run promotion (admin only)
/// /admin/promocion/{year}                     saga log (admin only)
/// /admin/promocion/{year}/reanudar            resume (admin only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/usuarios", usuarios::router())
        .nest("/alumnos", alumnos::router())
        .route("/consulta", get(handlers::consulta::search_students))
        .route("/egresados", get(handlers::egresados::list_graduates))
        .nest("/catalogo", catalogo::router())
        .nest("/admin", admin::router())
}

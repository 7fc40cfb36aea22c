//! Request handlers, one submodule per resource.
//!
//! Handlers delegate to the repositories in `ipa_db` and the pure logic in
//! `ipa_core`, and map errors via [`AppError`](crate::error::AppError).

pub mod alumnos;
pub mod auth;
pub mod catalogo;
pub mod consulta;
pub mod egresados;
pub mod promocion;
pub mod usuarios;

use ipa_core::grade::GradeLevel;
use ipa_core::paths::is_valid_key;

use crate::error::{AppError, AppResult};

/// Parse a grade tag taken from the URL path.
pub(crate) fn parse_level(tag: &str) -> AppResult<GradeLevel> {
    Ok(tag.parse::<GradeLevel>()?)
}

/// Reject a record key taken from the request unless it names exactly one
/// child. Path parameters arrive with `%2F` already decoded.
pub(crate) fn validate_key(key: &str) -> AppResult<()> {
    if !is_valid_key(key) {
        return Err(AppError::BadRequest(format!("Invalid record key '{key}'")));
    }
    Ok(())
}

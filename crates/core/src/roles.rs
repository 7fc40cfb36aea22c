//! Well-known role name constants.
//!
//! These are the exact `rol` strings stored on `usuarios/<key>` entries.

pub const ROLE_ADMIN: &str = "Admin";
pub const ROLE_PROFESOR: &str = "Profesor";
pub const ROLE_ESTUDIANTE: &str = "Estudiante";

/// All roles an account may carry.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_PROFESOR, ROLE_ESTUDIANTE];

/// Roles that manage student records, the catalog, and list views.
pub const STAFF_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_PROFESOR];

pub fn is_valid_role(role: &str) -> bool {
    VALID_ROLES.contains(&role)
}

pub fn is_staff(role: &str) -> bool {
    STAFF_ROLES.contains(&role)
}

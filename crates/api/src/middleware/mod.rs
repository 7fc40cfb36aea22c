//! Request extractors for authentication ([`auth::AuthUser`]) and role
//! checks ([`rbac::RequireAdmin`], [`rbac::RequireStaff`]).

pub mod auth;
pub mod rbac;

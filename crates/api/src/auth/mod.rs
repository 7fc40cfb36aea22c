//! Local accounts: [`password`] hashing and [`jwt`] session tokens.

pub mod jwt;
pub mod password;

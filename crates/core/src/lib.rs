//! Domain logic for the IPA project-tracking backend.
//!
//! Everything in this crate is pure: no store access, no async, no I/O.
//! The `ipa-db` crate persists these shapes and `ipa-api` orchestrates them.

pub mod account;
pub mod catalog;
pub mod error;
pub mod grade;
pub mod import;
pub mod paths;
pub mod promotion;
pub mod roles;
pub mod search;
pub mod student;
pub mod types;

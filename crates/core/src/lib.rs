//! Domain rules for the OKR performance-review backend.
//!
//! Everything in this crate is pure: no database, no HTTP. The `db`,
//! `lifecycle` and `api` crates pass data in and act on the results.

pub mod comment;
pub mod employee;
pub mod error;
pub mod identity;
pub mod notification;
pub mod rating;
pub mod review;
pub mod roles;
pub mod search;
pub mod template;
pub mod types;

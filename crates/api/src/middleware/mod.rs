//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.
//! - [`rbac::RequireHr`] -- Requires `hr` or `admin`.
//! - [`rbac::RequireManager`] -- Requires `manager`, `hr` or `admin`.
//! - [`acting::Acting`] -- The [`ActingUser`](okr_core::identity::ActingUser)
//!   threaded into lifecycle operations.

pub mod acting;
pub mod auth;
pub mod rbac;

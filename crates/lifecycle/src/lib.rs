//! Review lifecycle engine.
//!
//! Every operation follows the same shape: load the review graph, apply a
//! pure transition against it in memory, persist once, then publish the
//! resulting notification events. The pure halves live in [`engine`],
//! [`rating`] and [`instantiate`] and are tested without a database; the
//! async halves live in [`service`] and [`instantiate`].
//!
//! - [`access`] -- the caller's relationship to a review.
//! - [`engine`] -- status transitions and their side effects.
//! - [`rating`] -- merging rating / comment edits into a review graph.
//! - [`instantiate`] -- cloning a template into new reviews.
//! - [`service`] -- load / apply / save / publish orchestration.

pub mod access;
pub mod engine;
pub mod error;
pub mod instantiate;
pub mod rating;
pub mod service;

pub use error::{LifecycleError, LifecycleResult};

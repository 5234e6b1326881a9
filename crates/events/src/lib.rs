//! Notification side-channel for the review lifecycle.
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`NotificationEvent`] -- an outbound "notify this user" event emitted by
//!   lifecycle transitions.
//! - [`NotificationSink`] -- background consumer that persists every event
//!   as a `notifications` row.
//!
//! Publishing never blocks or fails the operation that emitted the event.

pub mod bus;
pub mod sink;

pub use bus::{EventBus, NotificationEvent};
pub use sink::NotificationSink;

//! Database models.
//!
//! Each submodule contains `FromRow + Serialize` entities, `Deserialize`
//! create DTOs, and update DTOs where the entity is editable.

pub mod employee;
pub mod notification;
pub mod report;
pub mod review;
pub mod role;
pub mod template;

//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod employee_repo;
pub mod notification_repo;
pub mod report_repo;
pub mod review_comment_repo;
pub mod review_repo;
pub mod role_repo;
pub mod template_repo;

pub use employee_repo::EmployeeRepo;
pub use notification_repo::NotificationRepo;
pub use report_repo::ReportRepo;
pub use review_comment_repo::ReviewCommentRepo;
pub use review_repo::ReviewRepo;
pub use role_repo::RoleRepo;
pub use template_repo::TemplateRepo;

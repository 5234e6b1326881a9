pub mod employee;
pub mod notification;
pub mod report;
pub mod review;
pub mod role;
pub mod template;

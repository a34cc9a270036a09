pub mod file;
pub mod member;
pub mod project;
pub mod project_user;
pub mod user;

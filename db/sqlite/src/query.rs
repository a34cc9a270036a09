pub mod file;
pub mod project;
pub mod project_user;
pub mod user;

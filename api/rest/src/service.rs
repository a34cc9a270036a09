pub mod file;
pub mod member;
pub mod project;
pub mod root;
pub mod user;

#[cfg(test)]
mod testing;

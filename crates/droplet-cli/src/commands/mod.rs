pub mod build;
pub mod height;

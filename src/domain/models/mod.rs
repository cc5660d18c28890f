pub mod file;
pub mod meal;

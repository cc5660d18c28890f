pub mod app;
pub mod selection;

pub mod dto;
pub mod error;
pub mod repositories;
pub mod selection;
pub mod services;

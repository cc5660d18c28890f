pub mod controllers;
mod dto;
pub mod error;
pub mod middleware;
pub mod repositories;
pub mod routes;
pub mod share_sessions;
pub mod state;
pub mod views;

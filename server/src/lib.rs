pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod export;
pub mod routes;
pub mod server_state;

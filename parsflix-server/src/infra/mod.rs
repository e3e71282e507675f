//! Server infrastructure: configuration and shared application state.

pub mod app_state;
pub mod config;

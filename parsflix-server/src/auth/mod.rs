//! Token issuance, verification, and the auth endpoints.

pub mod handlers;
pub mod jwt;
pub mod middleware;

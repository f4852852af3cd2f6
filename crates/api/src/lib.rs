//! HTTP API: the trusted admin validation endpoint.

pub mod app;
pub mod context;
pub mod jwt;
pub mod middleware;

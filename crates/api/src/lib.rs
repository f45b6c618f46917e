//! HTTP API layer for the EnlaPet backend.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: feed, posts, profiles, notifications
//! - **Extractors**: bearer-token authentication
//! - **Middleware**: token resolution, application state
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;

//! Core business logic for the EnlaPet backend.

pub mod services;

pub use services::*;

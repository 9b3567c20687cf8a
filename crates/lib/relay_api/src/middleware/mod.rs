//! Route middleware.

pub mod auth;

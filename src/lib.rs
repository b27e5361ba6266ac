//! Pressroom content publishing service.
//!
//! Core logic for content items: slug allocation, publication policy,
//! preview tokens, and recommendation matching. The `pressroom` binary
//! wraps these services in a thin HTTP transport.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

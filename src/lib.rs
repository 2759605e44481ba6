//! Task Forest
//!
//! Per-user task hierarchies with ownership checks and cascading soft-delete,
//! served over a small JSON API.

pub mod auth;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod server;
pub mod service;
pub mod store;
pub mod tree;
pub mod types;

//! # Taskboard Shared Library
//!
//! This crate contains the shared types, persistence layer, and board rules
//! used by the Taskboard API server and the board client.
//!
//! ## Module Organization
//!
//! - `models`: Users, columns, and tasks with their PostgreSQL operations
//! - `status`: Task status values and the status ↔ column mapping
//! - `error`: Board error taxonomy and the JSON error body
//! - `guard`: Deletion guards protecting assignee references
//! - `repository`: Persistence contract with PostgreSQL and in-memory backends
//! - `service`: Server-side consistency rules on top of a repository
//! - `seed`: Default columns and demo data
//! - `db`: Connection pool and migrations

pub mod db;
pub mod error;
pub mod guard;
pub mod models;
pub mod repository;
pub mod seed;
pub mod service;
pub mod status;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

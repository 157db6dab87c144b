//! Design Library Core - Shared types library.
//!
//! This crate provides common types used across all design library components:
//! - `api` - JSON API server (notifications, billing, admin console)
//! - `cli` - Command-line tools for migrations, users and sessions
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and easy to test.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, emails, roles, billing price types, statuses and pagination

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

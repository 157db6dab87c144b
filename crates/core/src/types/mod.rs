//! Core types for the design library.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod billing;
pub mod email;
pub mod id;
pub mod pagination;
pub mod role;
pub mod status;

pub use billing::{PriceType, PriceTypeError};
pub use email::{Email, EmailError};
pub use id::*;
pub use pagination::{Page, PageRequest, parse_saturating, saturating_i64};
pub use role::{Role, RoleError};
pub use status::{ImportJobStatus, ImportLogStatus, QueueJobState, StatusError};

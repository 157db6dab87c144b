//! Admin console routes.
//!
//! Every handler takes [`RequireAdmin`](crate::middleware::RequireAdmin) as its
//! first extractor, so the role check runs before any other input is read.

pub mod email_templates;
pub mod imports;
pub mod jobs;

//! Domain models for the API.
//!
//! These types represent validated domain objects separate from database row
//! types. Row types live next to their queries in [`crate::db`].

pub mod download;
pub mod email_template;
pub mod identity;
pub mod import;
pub mod notification;
pub mod tier;

pub use download::{Download, DownloadedDesign};
pub use email_template::{EmailTemplate, EmailTemplateRecord, TemplateVariable};
pub use identity::{Identity, NewProfile, SessionRecord};
pub use import::{ImportJob, ImportLog, ImportLogFacets, ImportLogFilter};
pub use notification::Notification;
pub use tier::Tier;

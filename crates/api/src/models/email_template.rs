//! Email template domain types and the per-template variable registry.
//!
//! Templates are edited in the database; the variables each template may
//! reference are fixed by the code that renders it, so they live here.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A placeholder that a template body or subject may use as `{{name}}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TemplateVariable {
    pub name: &'static str,
    pub description: &'static str,
    /// Sample value shown in the admin preview.
    pub example: &'static str,
    pub required: bool,
}

/// A template as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailTemplateRecord {
    pub key: String,
    pub name: String,
    pub subject: String,
    pub body: String,
    pub description: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// A template with its variable definitions attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailTemplate {
    pub key: String,
    pub name: String,
    pub subject: String,
    pub body: String,
    pub description: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub variables: &'static [TemplateVariable],
}

impl From<EmailTemplateRecord> for EmailTemplate {
    fn from(record: EmailTemplateRecord) -> Self {
        let variables = variables_for(&record.key);
        Self {
            key: record.key,
            name: record.name,
            subject: record.subject,
            body: record.body,
            description: record.description,
            updated_at: record.updated_at,
            variables,
        }
    }
}

const fn var(
    name: &'static str,
    description: &'static str,
    example: &'static str,
    required: bool,
) -> TemplateVariable {
    TemplateVariable {
        name,
        description,
        example,
        required,
    }
}

const USER_NAME: TemplateVariable = var("user_name", "Recipient display name", "Alex", false);
const APP_URL: TemplateVariable = var(
    "app_url",
    "Public URL of the web app",
    "https://designs.example.com",
    true,
);

const WELCOME: &[TemplateVariable] = &[USER_NAME, APP_URL];

const PASSWORD_RESET: &[TemplateVariable] = &[
    USER_NAME,
    var(
        "reset_url",
        "One-time password reset link",
        "https://designs.example.com/reset?token=abc123",
        true,
    ),
    var("expires_in", "How long the link stays valid", "1 hour", true),
];

const SUBSCRIPTION_CONFIRMED: &[TemplateVariable] = &[
    USER_NAME,
    var("tier_name", "Purchased membership tier", "Pro", true),
    var("price_type", "yearly or lifetime", "yearly", true),
    var("amount", "Formatted amount charged", "$49.00", true),
    var(
        "renews_at",
        "Next renewal date (yearly only)",
        "March 3, 2027",
        false,
    ),
    APP_URL,
];

const SUBSCRIPTION_CANCELLED: &[TemplateVariable] = &[
    USER_NAME,
    var("tier_name", "Cancelled membership tier", "Pro", true),
    var(
        "access_until",
        "Last day of paid access",
        "March 3, 2027",
        true,
    ),
    APP_URL,
];

const DOWNLOAD_READY: &[TemplateVariable] = &[
    USER_NAME,
    var("design_title", "Title of the design", "Celtic Knot Coaster", true),
    var("file_type", "Downloaded format", "svg", true),
    var(
        "download_url",
        "Signed download link",
        "https://designs.example.com/d/celtic-knot-coaster",
        true,
    ),
];

const IMPORT_COMPLETE: &[TemplateVariable] = &[
    var("job_id", "Import job ID", "3f0c2a9e-1b7d-4c55-9a57-0f6e1d2c8b41", true),
    var("source_path", "Folder that was imported", "/mnt/nas/designs/2026", true),
    var("imported", "Number of new designs", "128", true),
    var("updated", "Number of new versions", "12", true),
    var("skipped", "Number of skipped files", "7", true),
    var("failed", "Number of failed files", "1", true),
    APP_URL,
];

/// Variable definitions for a template key. Unknown keys have none.
#[must_use]
pub fn variables_for(key: &str) -> &'static [TemplateVariable] {
    match key {
        "welcome" => WELCOME,
        "password_reset" => PASSWORD_RESET,
        "subscription_confirmed" => SUBSCRIPTION_CONFIRMED,
        "subscription_cancelled" => SUBSCRIPTION_CANCELLED,
        "download_ready" => DOWNLOAD_READY,
        "import_complete" => IMPORT_COMPLETE,
        _ => &[],
    }
}

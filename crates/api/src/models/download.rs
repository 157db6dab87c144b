//! Download history domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use design_library_core::{DesignId, DownloadId};

/// The design a download refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadedDesign {
    pub id: DesignId,
    pub title: String,
    pub slug: String,
    /// Storage path of the preview image, if one was generated.
    pub preview_path: Option<String>,
}

/// One file download by the current user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Download {
    pub id: DownloadId,
    pub design: DownloadedDesign,
    /// Format that was downloaded (`svg`, `dxf`, ...).
    pub file_type: String,
    pub created_at: DateTime<Utc>,
}

//! Design import job domain types.
//!
//! Jobs and their per-file logs are written by the ingestion pipeline; the
//! API only reads them.

use chrono::{DateTime, Utc};
use serde::Serialize;

use design_library_core::{DesignId, ImportJobId, ImportJobStatus, ImportLogId, ImportLogStatus, UserId};

/// One run of the ingestion pipeline over a source folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportJob {
    pub id: ImportJobId,
    pub status: ImportJobStatus,
    /// Folder or bucket prefix that was scanned.
    pub source_path: String,
    pub total_files: i64,
    pub processed_files: i64,
    pub skipped_files: i64,
    pub failed_files: i64,
    pub created_by: Option<UserId>,
    /// Why the job failed, when `status` is `failed`.
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Outcome for one file of an import job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportLog {
    pub id: ImportLogId,
    pub job_id: ImportJobId,
    pub file_path: String,
    /// Lowercase extension without the dot.
    pub file_type: Option<String>,
    pub status: ImportLogStatus,
    /// Why the file was skipped or failed.
    pub reason: Option<String>,
    /// Design created or updated by this file.
    pub design_id: Option<DesignId>,
    pub created_at: DateTime<Utc>,
}

/// Optional filters for listing import logs. All present filters must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportLogFilter {
    pub status: Option<ImportLogStatus>,
    pub reason: Option<String>,
    pub file_type: Option<String>,
}

impl ImportLogFilter {
    /// Returns `true` if `log` passes every filter that is set.
    #[must_use]
    pub fn matches(&self, log: &ImportLog) -> bool {
        self.status.is_none_or(|status| log.status == status)
            && self
                .reason
                .as_ref()
                .is_none_or(|reason| log.reason.as_ref() == Some(reason))
            && self
                .file_type
                .as_ref()
                .is_none_or(|file_type| log.file_type.as_ref() == Some(file_type))
    }
}

/// Distinct filter values present in a job's logs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportLogFacets {
    /// Distinct non-empty reasons, sorted.
    pub reasons: Vec<String>,
    /// Distinct file types, sorted.
    pub file_types: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(status: ImportLogStatus, reason: Option<&str>, file_type: &str) -> ImportLog {
        ImportLog {
            id: ImportLogId::random(),
            job_id: ImportJobId::random(),
            file_path: format!("designs/coaster.{file_type}"),
            file_type: Some(file_type.to_string()),
            status,
            reason: reason.map(String::from),
            design_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = ImportLogFilter::default();
        assert!(filter.matches(&log(ImportLogStatus::Imported, None, "svg")));
        assert!(filter.matches(&log(ImportLogStatus::Failed, Some("corrupt file"), "dxf")));
    }

    #[test]
    fn test_filters_combine() {
        let filter = ImportLogFilter {
            status: Some(ImportLogStatus::Skipped),
            reason: Some("duplicate hash".to_string()),
            file_type: None,
        };
        assert!(filter.matches(&log(ImportLogStatus::Skipped, Some("duplicate hash"), "svg")));
        assert!(!filter.matches(&log(ImportLogStatus::Skipped, Some("unsupported"), "svg")));
        assert!(!filter.matches(&log(ImportLogStatus::Failed, Some("duplicate hash"), "svg")));
        assert!(!filter.matches(&log(ImportLogStatus::Skipped, None, "svg")));
    }
}

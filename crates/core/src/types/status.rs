//! Status enums for import jobs, import log rows and queue jobs.
//!
//! Import statuses are written by the design ingestion pipeline and stored as
//! lowercase text. Queue job states come from the managed queue API.

use serde::{Deserialize, Serialize};

/// Error returned when a status string is not recognized.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind}: {value:?} (expected one of: {})", .expected.join(", "))]
pub struct StatusError {
    /// Which status type was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
    /// Accepted values.
    pub expected: &'static [&'static str],
}

/// Declares a lowercase string-backed status enum with `as_str`, `ALL`,
/// `Display` and `FromStr`.
macro_rules! string_status {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every variant, in lifecycle order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The string stored in the database and used on the wire.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = StatusError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(StatusError {
                        kind: $kind,
                        value: other.to_owned(),
                        expected: &[$($text),+],
                    }),
                }
            }
        }
    };
}

string_status! {
    /// Lifecycle of a design import job.
    ImportJobStatus, "import job status" {
        /// Queued, not yet picked up.
        Pending => "pending",
        /// Files are being processed.
        Running => "running",
        /// Every file was processed (some may have been skipped or failed).
        Completed => "completed",
        /// The job aborted.
        Failed => "failed",
    }
}

string_status! {
    /// Outcome for a single file inside an import job.
    ImportLogStatus, "import log status" {
        /// A new design was created.
        Imported => "imported",
        /// An existing design received a new version.
        Updated => "updated",
        /// The file was ignored (duplicate hash, unsupported type, ...).
        Skipped => "skipped",
        /// The file could not be processed.
        Failed => "failed",
    }
}

string_status! {
    /// State of a job in the managed background queue.
    QueueJobState, "queue job state" {
        Waiting => "waiting",
        Active => "active",
        Delayed => "delayed",
        Completed => "completed",
        Failed => "failed",
        Paused => "paused",
        /// Anything the queue reports that is not listed above.
        Unknown => "unknown",
    }
}

impl ImportJobStatus {
    /// Returns `true` once the job will not change any more.
    #[must_use]
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl QueueJobState {
    /// Parse a queue-reported state, mapping unrecognized values to `Unknown`.
    #[must_use]
    pub fn parse_lenient(s: &str) -> Self {
        s.to_ascii_lowercase().parse().unwrap_or(Self::Unknown)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_import_job_status_parse() {
        for status in ImportJobStatus::ALL {
            assert_eq!(status.as_str().parse::<ImportJobStatus>().unwrap(), *status);
        }
        let err = "done".parse::<ImportJobStatus>().unwrap_err();
        assert_eq!(err.kind, "import job status");
        assert!(err.to_string().contains("pending, running, completed, failed"));
    }

    #[test]
    fn test_import_log_status_rejects_unknown() {
        assert_eq!(
            "skipped".parse::<ImportLogStatus>().unwrap(),
            ImportLogStatus::Skipped
        );
        assert!("Skipped".parse::<ImportLogStatus>().is_err());
        assert!("deleted".parse::<ImportLogStatus>().is_err());
    }

    #[test]
    fn test_finished() {
        assert!(ImportJobStatus::Completed.is_finished());
        assert!(ImportJobStatus::Failed.is_finished());
        assert!(!ImportJobStatus::Running.is_finished());
    }

    #[test]
    fn test_queue_state_lenient() {
        assert_eq!(QueueJobState::parse_lenient("ACTIVE"), QueueJobState::Active);
        assert_eq!(
            QueueJobState::parse_lenient("waiting-children"),
            QueueJobState::Unknown
        );
    }

    #[test]
    fn test_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&ImportLogStatus::Imported).unwrap(),
            "\"imported\""
        );
    }
}

//! In-app notification domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use design_library_core::{NotificationId, UserId};

/// A notification addressed to a single user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: NotificationId,
    #[serde(skip)]
    pub user_id: UserId,
    /// Category such as `import_complete` or `subscription_renewed`.
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub body: Option<String>,
    /// Relative link into the web app.
    pub link: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

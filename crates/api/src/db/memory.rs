//! In-memory implementation of every store trait, for tests.
//!
//! Seed it with the `insert_*` methods, hand it to
//! [`crate::state::Backends::in_memory`], and use [`InMemoryStore::data_calls`]
//! to assert whether a handler reached the data layer.

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;

use design_library_core::{ImportJobId, NotificationId, Page, TierId, UserId};

use super::{
    DownloadStore, EmailTemplateStore, IdentityStore, ImportStore, NotificationStore, Paged,
    RepositoryError, TierStore,
};
use crate::models::{
    Download, EmailTemplateRecord, Identity, ImportJob, ImportLog, ImportLogFacets,
    ImportLogFilter, Notification, SessionRecord, Tier,
};

#[derive(Default)]
struct Data {
    profiles: HashMap<UserId, Identity>,
    sessions: HashMap<String, SessionRecord>,
    notifications: Vec<Notification>,
    templates: Vec<EmailTemplateRecord>,
    jobs: Vec<ImportJob>,
    logs: Vec<ImportLog>,
    downloads: Vec<(UserId, Download)>,
    tiers: Vec<Tier>,
}

/// In-memory store. Session lookups are counted separately from data calls
/// so tests can tell "authenticated" apart from "touched the data".
#[derive(Default)]
pub struct InMemoryStore {
    data: Mutex<Data>,
    session_calls: AtomicUsize,
    data_calls: AtomicUsize,
    fail_with_corruption: Mutex<Option<String>>,
}

fn page_of<T: Clone>(items: &[T], page: Page) -> Paged<T> {
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
    Paged {
        items: items.iter().skip(offset).take(limit).cloned().collect(),
        total: items.len() as u64,
    }
}

#[allow(clippy::expect_used)]
impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of identity/session calls made so far.
    pub fn session_calls(&self) -> usize {
        self.session_calls.load(Ordering::Relaxed)
    }

    /// Number of non-session calls (notifications, templates, imports, ...).
    pub fn data_calls(&self) -> usize {
        self.data_calls.load(Ordering::Relaxed)
    }

    /// Make every subsequent data call fail with `DataCorruption(message)`.
    pub fn fail_data_calls(&self, message: &str) {
        *self.fail_with_corruption.lock().expect("lock poisoned") = Some(message.to_string());
    }

    /// Add a profile and a session for it.
    pub fn insert_identity(&self, identity: Identity, token_hash: &str) {
        let mut data = self.data.lock().expect("lock poisoned");
        data.sessions.insert(
            token_hash.to_string(),
            SessionRecord {
                token_hash: token_hash.to_string(),
                user_id: identity.id,
                created_at: Utc::now(),
                expires_at: None,
                last_used_at: None,
            },
        );
        data.profiles.insert(identity.id, identity);
    }

    /// Add a session with explicit fields (e.g. already expired).
    pub fn insert_session(&self, session: SessionRecord) {
        self.data
            .lock()
            .expect("lock poisoned")
            .sessions
            .insert(session.token_hash.clone(), session);
    }

    /// Look at a stored session.
    pub fn session(&self, token_hash: &str) -> Option<SessionRecord> {
        self.data
            .lock()
            .expect("lock poisoned")
            .sessions
            .get(token_hash)
            .cloned()
    }

    pub fn insert_notification(&self, notification: Notification) {
        self.data
            .lock()
            .expect("lock poisoned")
            .notifications
            .push(notification);
    }

    pub fn insert_template(&self, template: EmailTemplateRecord) {
        self.data
            .lock()
            .expect("lock poisoned")
            .templates
            .push(template);
    }

    pub fn insert_job(&self, job: ImportJob) {
        self.data.lock().expect("lock poisoned").jobs.push(job);
    }

    pub fn insert_log(&self, log: ImportLog) {
        self.data.lock().expect("lock poisoned").logs.push(log);
    }

    pub fn insert_download(&self, user_id: UserId, download: Download) {
        self.data
            .lock()
            .expect("lock poisoned")
            .downloads
            .push((user_id, download));
    }

    pub fn insert_tier(&self, tier: Tier) {
        self.data.lock().expect("lock poisoned").tiers.push(tier);
    }

    fn count_session_call(&self) {
        self.session_calls.fetch_add(1, Ordering::Relaxed);
    }

    fn count_data_call(&self) -> Result<(), RepositoryError> {
        self.data_calls.fetch_add(1, Ordering::Relaxed);
        match self.fail_with_corruption.lock().expect("lock poisoned").as_ref() {
            Some(message) => Err(RepositoryError::DataCorruption(message.clone())),
            None => Ok(()),
        }
    }
}

#[allow(clippy::expect_used)]
#[async_trait]
impl IdentityStore for InMemoryStore {
    async fn find_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<Identity>, RepositoryError> {
        self.count_session_call();
        let data = self.data.lock().expect("lock poisoned");
        Ok(data
            .sessions
            .get(token_hash)
            .filter(|session| session.is_active_at(Utc::now()))
            .and_then(|session| data.profiles.get(&session.user_id))
            .cloned())
    }

    async fn touch_session(&self, token_hash: &str) -> Result<(), RepositoryError> {
        self.count_session_call();
        if let Some(session) = self
            .data
            .lock()
            .expect("lock poisoned")
            .sessions
            .get_mut(token_hash)
        {
            session.last_used_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn revoke_session(&self, token_hash: &str) -> Result<bool, RepositoryError> {
        self.count_session_call();
        Ok(self
            .data
            .lock()
            .expect("lock poisoned")
            .sessions
            .remove(token_hash)
            .is_some())
    }
}

#[allow(clippy::expect_used)]
#[async_trait]
impl NotificationStore for InMemoryStore {
    async fn list_for_user(
        &self,
        user_id: UserId,
        unread_only: bool,
        limit: u32,
    ) -> Result<Vec<Notification>, RepositoryError> {
        self.count_data_call()?;
        let data = self.data.lock().expect("lock poisoned");
        let mut items: Vec<Notification> = data
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && (!unread_only || !n.read))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(items)
    }

    async fn count_unread(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        self.count_data_call()?;
        let data = self.data.lock().expect("lock poisoned");
        Ok(data
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && !n.read)
            .count() as u64)
    }

    async fn mark_read(
        &self,
        user_id: UserId,
        ids: &[NotificationId],
    ) -> Result<u64, RepositoryError> {
        self.count_data_call()?;
        let mut data = self.data.lock().expect("lock poisoned");
        let mut updated = 0;
        for notification in &mut data.notifications {
            if notification.user_id == user_id && !notification.read && ids.contains(&notification.id) {
                notification.read = true;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn mark_all_read(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        self.count_data_call()?;
        let mut data = self.data.lock().expect("lock poisoned");
        let mut updated = 0;
        for notification in &mut data.notifications {
            if notification.user_id == user_id && !notification.read {
                notification.read = true;
                updated += 1;
            }
        }
        Ok(updated)
    }
}

#[allow(clippy::expect_used)]
#[async_trait]
impl EmailTemplateStore for InMemoryStore {
    async fn list(&self) -> Result<Vec<EmailTemplateRecord>, RepositoryError> {
        self.count_data_call()?;
        let mut templates = self.data.lock().expect("lock poisoned").templates.clone();
        templates.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(templates)
    }

    async fn get(&self, key: &str) -> Result<Option<EmailTemplateRecord>, RepositoryError> {
        self.count_data_call()?;
        Ok(self
            .data
            .lock()
            .expect("lock poisoned")
            .templates
            .iter()
            .find(|t| t.key == key)
            .cloned())
    }
}

#[allow(clippy::expect_used)]
#[async_trait]
impl ImportStore for InMemoryStore {
    async fn list_jobs(&self, page: Page) -> Result<Paged<ImportJob>, RepositoryError> {
        self.count_data_call()?;
        let mut jobs = self.data.lock().expect("lock poisoned").jobs.clone();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page_of(&jobs, page))
    }

    async fn get_job(&self, id: ImportJobId) -> Result<Option<ImportJob>, RepositoryError> {
        self.count_data_call()?;
        Ok(self
            .data
            .lock()
            .expect("lock poisoned")
            .jobs
            .iter()
            .find(|job| job.id == id)
            .cloned())
    }

    async fn list_logs(
        &self,
        job_id: ImportJobId,
        filter: &ImportLogFilter,
        page: Page,
    ) -> Result<Paged<ImportLog>, RepositoryError> {
        self.count_data_call()?;
        let mut logs: Vec<ImportLog> = self
            .data
            .lock()
            .expect("lock poisoned")
            .logs
            .iter()
            .filter(|log| log.job_id == job_id && filter.matches(log))
            .cloned()
            .collect();
        logs.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(page_of(&logs, page))
    }

    async fn log_facets(&self, job_id: ImportJobId) -> Result<ImportLogFacets, RepositoryError> {
        self.count_data_call()?;
        let data = self.data.lock().expect("lock poisoned");
        let mut reasons = BTreeSet::new();
        let mut file_types = BTreeSet::new();
        for log in data.logs.iter().filter(|log| log.job_id == job_id) {
            if let Some(reason) = log.reason.as_ref().filter(|r| !r.is_empty()) {
                reasons.insert(reason.clone());
            }
            if let Some(file_type) = log.file_type.as_ref().filter(|t| !t.is_empty()) {
                file_types.insert(file_type.clone());
            }
        }
        Ok(ImportLogFacets {
            reasons: reasons.into_iter().collect(),
            file_types: file_types.into_iter().collect(),
        })
    }
}

#[allow(clippy::expect_used)]
#[async_trait]
impl DownloadStore for InMemoryStore {
    async fn list_for_user(
        &self,
        user_id: UserId,
        page: Page,
    ) -> Result<Paged<Download>, RepositoryError> {
        self.count_data_call()?;
        let mut downloads: Vec<Download> = self
            .data
            .lock()
            .expect("lock poisoned")
            .downloads
            .iter()
            .filter(|(owner, _)| *owner == user_id)
            .map(|(_, download)| download.clone())
            .collect();
        downloads.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page_of(&downloads, page))
    }
}

#[allow(clippy::expect_used)]
#[async_trait]
impl TierStore for InMemoryStore {
    async fn get(&self, id: TierId) -> Result<Option<Tier>, RepositoryError> {
        self.count_data_call()?;
        Ok(self
            .data
            .lock()
            .expect("lock poisoned")
            .tiers
            .iter()
            .find(|tier| tier.id == id)
            .cloned())
    }
}

//! Dataset sessions
//!
//! Holds an uploaded dataset and its most recent detection result between
//! requests. Sessions expire after an idle TTL and are purged lazily. When
//! the store is full, the least recently used session is evicted.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use uuid::Uuid;

use crate::models::{AnomalyReport, Dataset, DatasetSummary, PREVIEW_ROWS};

#[derive(Debug, Clone)]
pub struct DatasetSession {
    pub id: Uuid,
    pub dataset: Arc<Dataset>,
    pub last_result: Option<Arc<AnomalyReport>>,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
}

impl DatasetSession {
    fn new(dataset: Dataset, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            dataset: Arc::new(dataset),
            last_result: None,
            created_at: now,
            last_accessed: now,
        }
    }

    fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.last_accessed > ttl
    }

    fn summary(&self, ttl: Duration) -> DatasetSummary {
        let dataset = &self.dataset;
        let names = dataset.column_names();

        DatasetSummary {
            session_id: self.id,
            columns: dataset.columns().to_vec(),
            numeric_columns: dataset.numeric_columns().into_iter().map(|i| names[i].clone()).collect(),
            row_count: dataset.row_count(),
            preview: dataset.head(PREVIEW_ROWS),
            has_result: self.last_result.is_some(),
            created_at: self.created_at,
            expires_at: self.last_accessed + ttl,
        }
    }
}

/// Shared session store
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, DatasetSession>>>,
    ttl: Duration,
    capacity: usize,
}

impl SessionStore {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// Store a dataset under a fresh session
    pub fn create(&self, dataset: Dataset) -> DatasetSummary {
        let now = Utc::now();
        self.purge_expired_at(now);

        let session = DatasetSession::new(dataset, now);
        let summary = session.summary(self.ttl);
        {
            let mut sessions = self.sessions.write();
            while sessions.len() >= self.capacity {
                let Some(oldest) = sessions
                    .values()
                    .min_by_key(|s| s.last_accessed)
                    .map(|s| s.id)
                else {
                    break;
                };
                sessions.remove(&oldest);
                tracing::debug!(session_id = %oldest, "Dataset session evicted");
            }
            sessions.insert(session.id, session);
        }

        tracing::info!(
            session_id = %summary.session_id,
            rows = summary.row_count,
            columns = summary.columns.len(),
            "Dataset session created"
        );
        summary
    }

    pub fn summary(&self, id: Uuid) -> Option<DatasetSummary> {
        self.touch(id, Utc::now()).map(|s| s.summary(self.ttl))
    }

    pub fn dataset(&self, id: Uuid) -> Option<Arc<Dataset>> {
        self.touch(id, Utc::now()).map(|s| s.dataset)
    }

    /// Replace the session's last result; `None` if the session is gone
    pub fn record_result(&self, id: Uuid, report: AnomalyReport) -> Option<Arc<AnomalyReport>> {
        let now = Utc::now();
        let mut sessions = self.sessions.write();
        let session = sessions.get_mut(&id).filter(|s| !s.is_expired(now, self.ttl))?;

        let report = Arc::new(report);
        session.last_result = Some(report.clone());
        session.last_accessed = now;
        Some(report)
    }

    pub fn last_result(&self, id: Uuid) -> Option<Arc<AnomalyReport>> {
        self.touch(id, Utc::now()).and_then(|s| s.last_result)
    }

    pub fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop sessions idle for longer than the TTL
    pub fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(now, self.ttl));

        let purged = before - sessions.len();
        if purged > 0 {
            tracing::debug!(purged, "Expired dataset sessions purged");
        }
        purged
    }

    /// Refresh the idle timer and return a snapshot; expired sessions are dropped
    fn touch(&self, id: Uuid, now: DateTime<Utc>) -> Option<DatasetSession> {
        let mut sessions = self.sessions.write();
        let expired = sessions.get(&id)?.is_expired(now, self.ttl);
        if expired {
            sessions.remove(&id);
            return None;
        }

        let session = sessions.get_mut(&id)?;
        session.last_accessed = now;
        Some(session.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::detector::detect_anomalies;
    use crate::logic::model::ForestParams;

    fn dataset() -> Dataset {
        Dataset::from_csv_bytes(b"id,pressure\na,1.0\nb,1.1\nc,0.9\nd,9.0\n").unwrap()
    }

    #[test]
    fn test_create_and_summary() {
        let store = SessionStore::new(Duration::minutes(30), 10);
        let created = store.create(dataset());

        let summary = store.summary(created.session_id).unwrap();
        assert_eq!(summary.row_count, 4);
        assert_eq!(summary.numeric_columns, vec!["pressure"]);
        assert_eq!(summary.preview.len(), 4);
        assert!(!summary.has_result);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_record_and_fetch_result() {
        let store = SessionStore::new(Duration::minutes(30), 10);
        let id = store.create(dataset()).session_id;
        assert!(store.last_result(id).is_none());

        let ds = store.dataset(id).unwrap();
        let report = detect_anomalies(&ds, ForestParams::default()).unwrap();
        store.record_result(id, report).unwrap();

        assert_eq!(store.last_result(id).unwrap().total_rows, 4);
        assert!(store.summary(id).unwrap().has_result);
    }

    #[test]
    fn test_unknown_and_removed_sessions() {
        let store = SessionStore::new(Duration::minutes(30), 10);
        assert!(store.dataset(Uuid::new_v4()).is_none());

        let id = store.create(dataset()).session_id;
        assert!(store.remove(id));
        assert!(!store.remove(id));
        assert!(store.summary(id).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_expired_sessions_purged() {
        let store = SessionStore::new(Duration::minutes(30), 10);
        let id = store.create(dataset()).session_id;

        assert_eq!(store.purge_expired_at(Utc::now() + Duration::minutes(10)), 0);
        assert_eq!(store.purge_expired_at(Utc::now() + Duration::minutes(31)), 1);
        assert!(store.dataset(id).is_none());
    }

    #[test]
    fn test_full_store_evicts_least_recent() {
        let store = SessionStore::new(Duration::minutes(30), 2);
        let first = store.create(dataset()).session_id;
        let second = store.create(dataset()).session_id;

        // touching the first leaves the second as least recently used
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(store.summary(first).is_some());

        let third = store.create(dataset()).session_id;
        assert_eq!(store.len(), 2);
        assert!(store.dataset(second).is_none());
        assert!(store.dataset(first).is_some());
        assert!(store.dataset(third).is_some());
    }

    #[test]
    fn test_expired_session_not_touched() {
        let store = SessionStore::new(Duration::minutes(30), 10);
        let id = store.create(dataset()).session_id;

        assert!(store.touch(id, Utc::now() + Duration::hours(1)).is_none());
        assert!(store.is_empty());
    }
}

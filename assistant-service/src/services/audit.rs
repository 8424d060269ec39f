//! Audit logging collaborators.
//!
//! The orchestrator hands every audit artifact to an `AuditLog`. The
//! production implementation persists to MongoDB; the in-memory sink backs
//! local runs without a database and the integration tests.

use crate::models::record::{ContentFilterEvent, RequestRecord};
use async_trait::async_trait;
use mongodb::{
    Client as MongoClient, Collection, Database, IndexModel,
    bson::{Bson, doc},
    options::IndexOptions,
};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Error type for audit store operations.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Audit store error: {0}")]
    Store(String),
}

/// The logging collaborator of the pipeline.
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Persist the record of a successfully answered request and return an
    /// opaque log id for later feedback correlation.
    async fn record_request(&self, record: &RequestRecord) -> Result<String, AuditError>;

    /// Persist a content-filter refusal (question + truncated history,
    /// never an answer). Distinct from the standard request record.
    async fn record_content_filter(&self, event: &ContentFilterEvent) -> Result<(), AuditError>;

    async fn health_check(&self) -> Result<(), AuditError>;
}

/// MongoDB-backed audit log.
#[derive(Clone)]
pub struct MongoAuditLog {
    client: MongoClient,
    db: Database,
}

impl MongoAuditLog {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AuditError> {
        tracing::info!(database = %database, "Connecting to MongoDB audit store");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AuditError::Store(e.to_string())
        })?;
        let db = client.database(database);
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AuditError> {
        let session_time_index = IndexModel::builder()
            .keys(doc! { "session_id": 1, "timestamp": -1 })
            .options(
                IndexOptions::builder()
                    .name("session_time_idx".to_string())
                    .build(),
            )
            .build();

        self.requests()
            .create_index(session_time_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create session_time index: {}", e);
                AuditError::Store(e.to_string())
            })?;

        let event_time_index = IndexModel::builder()
            .keys(doc! { "timestamp": -1 })
            .options(
                IndexOptions::builder()
                    .name("event_time_idx".to_string())
                    .build(),
            )
            .build();

        self.content_filter_events()
            .create_index(event_time_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create event_time index: {}", e);
                AuditError::Store(e.to_string())
            })?;

        tracing::info!("Audit store indexes created");
        Ok(())
    }

    fn requests(&self) -> Collection<RequestRecord> {
        self.db.collection("requests")
    }

    fn content_filter_events(&self) -> Collection<ContentFilterEvent> {
        self.db.collection("content_filter_events")
    }
}

#[async_trait]
impl AuditLog for MongoAuditLog {
    async fn record_request(&self, record: &RequestRecord) -> Result<String, AuditError> {
        let result = self
            .requests()
            .insert_one(record, None)
            .await
            .map_err(|e| AuditError::Store(e.to_string()))?;

        let log_id = match result.inserted_id {
            Bson::ObjectId(oid) => oid.to_hex(),
            other => other.to_string(),
        };
        Ok(log_id)
    }

    async fn record_content_filter(&self, event: &ContentFilterEvent) -> Result<(), AuditError> {
        self.content_filter_events()
            .insert_one(event, None)
            .await
            .map_err(|e| AuditError::Store(e.to_string()))?;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), AuditError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AuditError::Store(e.to_string())
            })?;
        Ok(())
    }
}

/// In-memory audit sink, used when no MongoDB URI is configured and by the
/// integration tests. `fail_writes` lets tests exercise the audit-failure
/// path.
#[derive(Default)]
pub struct MemoryAuditLog {
    records: Mutex<Vec<RequestRecord>>,
    content_filter_events: Mutex<Vec<ContentFilterEvent>>,
    fail_writes: AtomicBool,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn records(&self) -> Vec<RequestRecord> {
        self.records.lock().expect("audit records lock").clone()
    }

    pub fn content_filter_events(&self) -> Vec<ContentFilterEvent> {
        self.content_filter_events
            .lock()
            .expect("content filter events lock")
            .clone()
    }
}

#[async_trait]
impl AuditLog for MemoryAuditLog {
    async fn record_request(&self, record: &RequestRecord) -> Result<String, AuditError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AuditError::Store("audit writes disabled".to_string()));
        }
        let mut records = self.records.lock().expect("audit records lock");
        records.push(record.clone());
        Ok(format!("mem-{}", records.len()))
    }

    async fn record_content_filter(&self, event: &ContentFilterEvent) -> Result<(), AuditError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AuditError::Store("audit writes disabled".to_string()));
        }
        self.content_filter_events
            .lock()
            .expect("content filter events lock")
            .push(event.clone());
        Ok(())
    }

    async fn health_check(&self) -> Result<(), AuditError> {
        Ok(())
    }
}

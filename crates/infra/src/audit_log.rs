//! Append-only audit trail of administrative actions.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;

use roster_core::AuditEntryId;

use crate::store::{Paged, StoreError, paginate};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEntry {
    pub id: AuditEntryId,
    #[serde(rename = "mensagem")]
    pub message: String,
    #[serde(rename = "data_cadastro")]
    pub created_at: DateTime<Utc>,
}

pub trait AuditLog: Send + Sync {
    /// Append a free-text entry.
    fn record(&self, message: String) -> Result<AuditEntry, StoreError>;

    /// Entries whose message contains `search`, newest first.
    fn list(&self, search: Option<&str>, page: u32, per_page: usize) -> Result<Paged<AuditEntry>, StoreError>;
}

impl<S> AuditLog for Arc<S>
where
    S: AuditLog + ?Sized,
{
    fn record(&self, message: String) -> Result<AuditEntry, StoreError> {
        (**self).record(message)
    }

    fn list(&self, search: Option<&str>, page: u32, per_page: usize) -> Result<Paged<AuditEntry>, StoreError> {
        (**self).list(search, page, per_page)
    }
}

/// In-memory audit log for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryAuditLog {
    entries: RwLock<Vec<AuditEntry>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Messages in insertion order.
    pub fn messages(&self) -> Vec<String> {
        match self.entries.read() {
            Ok(entries) => entries.iter().map(|e| e.message.clone()).collect(),
            Err(poisoned) => poisoned.into_inner().iter().map(|e| e.message.clone()).collect(),
        }
    }
}

impl AuditLog for InMemoryAuditLog {
    fn record(&self, message: String) -> Result<AuditEntry, StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::poisoned())?;
        let entry = AuditEntry {
            id: AuditEntryId::new(entries.len() as i64 + 1),
            message,
            created_at: Utc::now(),
        };
        entries.push(entry.clone());
        tracing::debug!(entry_id = %entry.id, "audit entry recorded");
        Ok(entry)
    }

    fn list(&self, search: Option<&str>, page: u32, per_page: usize) -> Result<Paged<AuditEntry>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::poisoned())?;
        let needle = search.map(str::trim).filter(|s| !s.is_empty());
        let mut rows: Vec<AuditEntry> = entries
            .iter()
            .filter(|e| needle.is_none_or(|n| e.message.contains(n)))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(paginate(rows, page, per_page))
    }
}

//! Form submission storage.
//!
//! Records live in memory. When opened with a journal path, every mutation
//! is also appended to a JSON-lines file and the file is replayed on open,
//! so the collection survives restarts. There is no concurrency control
//! beyond the lock around the collection: the last writer wins.

use crate::error::{ContextFillError, Result};
use crate::record::ExtractedRecord;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSubmission {
    pub id: String,
    #[serde(flatten)]
    pub fields: ExtractedRecord,
    /// Where the data came from, e.g. the uploaded file name or "manual".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_document: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client-supplied fields for a create or a partial update. Identifier and
/// timestamps are owned by the store and ignored if present in the input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionDraft {
    #[serde(flatten)]
    pub fields: ExtractedRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_document: Option<String>,
}

impl SubmissionDraft {
    pub fn new(fields: ExtractedRecord) -> Self {
        Self {
            fields,
            source_document: None,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source_document = Some(source.into());
        self
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
enum JournalEntry {
    Create { record: FormSubmission },
    Update { record: FormSubmission },
    Delete { id: String },
}

pub struct SubmissionStore {
    records: RwLock<Vec<FormSubmission>>,
    journal: Option<PathBuf>,
}

impl SubmissionStore {
    /// A store that forgets everything when dropped.
    pub fn in_memory() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            journal: None,
        }
    }

    /// Opens a journal-backed store, replaying `path` if it exists.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let records = replay(&path).await?;
        info!(
            "Loaded {} form submission(s) from {}",
            records.len(),
            path.display()
        );

        Ok(Self {
            records: RwLock::new(records),
            journal: Some(path),
        })
    }

    pub async fn create(&self, draft: SubmissionDraft) -> Result<FormSubmission> {
        let now = Utc::now();
        let mut fields = ExtractedRecord::new();
        fields.overlay(&draft.fields);

        let submission = FormSubmission {
            id: Uuid::new_v4().to_string(),
            fields,
            source_document: draft.source_document.filter(|s| !s.is_empty()),
            created_at: now,
            updated_at: now,
        };

        let mut records = self.records.write().await;
        self.append(&JournalEntry::Create {
            record: submission.clone(),
        })
        .await?;
        records.push(submission.clone());

        info!("Form submission created with ID: {}", submission.id);
        Ok(submission)
    }

    pub async fn get(&self, id: &str) -> Option<FormSubmission> {
        self.records
            .read()
            .await
            .iter()
            .find(|record| record.id == id)
            .cloned()
    }

    /// All submissions, newest first.
    pub async fn list(&self) -> Vec<FormSubmission> {
        let mut all: Vec<FormSubmission> = self.records.read().await.iter().rev().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all
    }

    /// Merges `draft` over the stored record. Fields absent from the draft
    /// are kept; fields given as an empty string are cleared.
    pub async fn update(&self, id: &str, draft: SubmissionDraft) -> Result<FormSubmission> {
        let mut records = self.records.write().await;
        let index = records
            .iter()
            .position(|record| record.id == id)
            .ok_or_else(|| not_found(id))?;

        let mut updated = records[index].clone();
        updated.fields.overlay(&draft.fields);
        if let Some(source) = draft.source_document {
            updated.source_document = Some(source).filter(|s| !s.is_empty());
        }
        updated.updated_at = Utc::now();

        self.append(&JournalEntry::Update {
            record: updated.clone(),
        })
        .await?;
        records[index] = updated.clone();

        debug!("Form submission updated: {}", id);
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let mut records = self.records.write().await;
        let index = records
            .iter()
            .position(|record| record.id == id)
            .ok_or_else(|| not_found(id))?;

        self.append(&JournalEntry::Delete { id: id.to_string() })
            .await?;
        records.remove(index);

        info!("Form submission deleted: {}", id);
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn append(&self, entry: &JournalEntry) -> Result<()> {
        let Some(path) = &self.journal else {
            return Ok(());
        };

        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

fn not_found(id: &str) -> ContextFillError {
    debug!("No form submission with ID: {}", id);
    ContextFillError::NotFound("Form submission not found".to_string())
}

async fn replay(path: &Path) -> Result<Vec<FormSubmission>> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut records: Vec<FormSubmission> = Vec::new();

    for (line_no, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let entry: JournalEntry = match serde_json::from_str(line) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(
                    "Skipping unreadable journal line {} in {}: {}",
                    line_no + 1,
                    path.display(),
                    e
                );
                continue;
            }
        };

        match entry {
            JournalEntry::Create { record } => records.push(record),
            JournalEntry::Update { record } => {
                match records.iter_mut().find(|r| r.id == record.id) {
                    Some(existing) => *existing = record,
                    None => warn!("Journal updates unknown submission {}", record.id),
                }
            }
            JournalEntry::Delete { id } => records.retain(|r| r.id != id),
        }
    }

    Ok(records)
}

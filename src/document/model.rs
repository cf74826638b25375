use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{DocumentError, DocumentResult};

/// Where an uploaded document is in the processing pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Queued,
    Uploading,
    Processing,
    Analyzing,
    Ready,
    Error,
}

impl ProcessingStatus {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Queued => "queued",
            ProcessingStatus::Uploading => "uploading",
            ProcessingStatus::Processing => "processing",
            ProcessingStatus::Analyzing => "analyzing",
            ProcessingStatus::Ready => "ready",
            ProcessingStatus::Error => "error",
        }
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProcessingStatus::Ready | ProcessingStatus::Error)
    }

    /// Coarse completion percentage shown while a document is in flight.
    #[inline]
    pub fn progress(&self) -> u8 {
        match self {
            ProcessingStatus::Queued | ProcessingStatus::Error => 0,
            ProcessingStatus::Uploading => 20,
            ProcessingStatus::Processing => 50,
            ProcessingStatus::Analyzing => 80,
            ProcessingStatus::Ready => 100,
        }
    }

    /// Returns `true` if `self -> next` is an allowed pipeline step.
    pub fn can_transition_to(&self, next: ProcessingStatus) -> bool {
        use ProcessingStatus::*;
        match (self, next) {
            (Queued, Uploading)
            | (Uploading, Processing)
            | (Processing, Analyzing)
            | (Analyzing, Ready)
            | (Error, Queued) => true,
            (from, Error) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl std::fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// AI-produced analysis attached to a ready document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    pub key_points: Vec<String>,
    pub topics: Vec<String>,
    pub sentiment: Option<String>,
}

/// An uploaded file and everything extracted from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedDocument {
    pub id: String,
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: ProcessingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<DocumentAnalysis>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ProcessedDocument {
    /// Creates a freshly uploaded document in the `Queued` state.
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, size_bytes: u64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            size_bytes,
            uploaded_at: now,
            updated_at: now,
            status: ProcessingStatus::Queued,
            error: None,
            extracted_text: None,
            summary: None,
            analysis: None,
            tags: Vec::new(),
        }
    }

    /// Moves the document to `next`, rejecting steps outside the pipeline.
    pub fn transition(&mut self, next: ProcessingStatus) -> DocumentResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(DocumentError::InvalidTransition {
                id: self.id.clone(),
                from: self.status,
                to: next,
            });
        }
        if next != ProcessingStatus::Error {
            self.error = None;
        }
        self.status = next;
        self.touch();
        Ok(())
    }

    /// Marks processing as failed with a user-facing message.
    pub fn fail(&mut self, message: impl Into<String>) -> DocumentResult<()> {
        self.transition(ProcessingStatus::Error)?;
        self.error = Some(message.into());
        Ok(())
    }

    pub fn set_extracted_text(&mut self, text: impl Into<String>) {
        self.extracted_text = Some(text.into());
        self.touch();
    }

    pub fn set_summary(&mut self, summary: impl Into<String>) {
        self.summary = Some(summary.into());
        self.touch();
    }

    pub fn set_analysis(&mut self, analysis: DocumentAnalysis) {
        self.analysis = Some(analysis);
        self.touch();
    }

    /// Adds a normalized (trimmed, lowercase) tag. Returns `false` for blanks and duplicates.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim().to_lowercase();
        if tag.is_empty() || self.tags.contains(&tag) {
            return false;
        }
        self.tags.push(tag);
        self.touch();
        true
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim().to_lowercase();
        let before = self.tags.len();
        self.tags.retain(|t| *t != tag);
        let removed = self.tags.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.status == ProcessingStatus::Ready
    }

    #[inline]
    pub fn progress(&self) -> u8 {
        self.status.progress()
    }

    /// Short type label used by search filters (`pdf`, `docx`, `txt`, ...).
    ///
    /// Taken from the file extension, falling back to the MIME subtype.
    pub fn document_type(&self) -> String {
        if let Some((stem, ext)) = self.file_name.rsplit_once('.')
            && !stem.is_empty()
            && !ext.is_empty()
        {
            return ext.to_lowercase();
        }
        self.mime_type
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_lowercase()
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

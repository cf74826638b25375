//! Test fixtures for integration tests.

use chrono::{DateTime, TimeZone, Utc};
use docsift::document::{DocumentAnalysis, ProcessedDocument, ProcessingStatus};

/// 2023-12-14T00:00:00Z.
pub const FIXED_TIMESTAMP: i64 = 1702512000;

pub fn fixed_time() -> DateTime<Utc> {
    Utc.timestamp_opt(FIXED_TIMESTAMP, 0)
        .single()
        .expect("valid timestamp")
}

#[derive(Default)]
pub struct DocumentBuilder {
    file_name: Option<String>,
    mime_type: Option<String>,
    text: Option<String>,
    summary: Option<String>,
    topics: Vec<String>,
    tags: Vec<String>,
    uploaded_at: Option<DateTime<Utc>>,
    status: Option<ProcessingStatus>,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file_name(mut self, name: &str) -> Self {
        self.file_name = Some(name.to_string());
        self
    }

    pub fn mime_type(mut self, mime: &str) -> Self {
        self.mime_type = Some(mime.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn summary(mut self, summary: &str) -> Self {
        self.summary = Some(summary.to_string());
        self
    }

    pub fn topic(mut self, topic: &str) -> Self {
        self.topics.push(topic.to_string());
        self
    }

    pub fn tag(mut self, tag: &str) -> Self {
        self.tags.push(tag.to_string());
        self
    }

    pub fn uploaded_at(mut self, at: DateTime<Utc>) -> Self {
        self.uploaded_at = Some(at);
        self
    }

    /// Uploaded `days` days before [`FIXED_TIMESTAMP`].
    pub fn days_old(self, days: i64) -> Self {
        self.uploaded_at(fixed_time() - chrono::Duration::days(days))
    }

    pub fn status(mut self, status: ProcessingStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn build(self) -> ProcessedDocument {
        let text = self.text.unwrap_or_default();
        let mut doc = ProcessedDocument::new(
            self.file_name.unwrap_or_else(|| "document.txt".to_string()),
            self.mime_type.unwrap_or_else(|| "text/plain".to_string()),
            text.len() as u64,
        );
        if !text.is_empty() {
            doc.set_extracted_text(text);
        }
        if let Some(summary) = self.summary {
            doc.set_summary(summary);
        }
        if !self.topics.is_empty() {
            doc.set_analysis(DocumentAnalysis {
                topics: self.topics,
                ..DocumentAnalysis::default()
            });
        }
        for tag in &self.tags {
            doc.add_tag(tag);
        }
        doc.status = self.status.unwrap_or(ProcessingStatus::Ready);
        let at = self.uploaded_at.unwrap_or_else(fixed_time);
        doc.uploaded_at = at;
        doc.updated_at = at;
        doc
    }
}

/// A small mixed library: two finance documents, a roadmap and a meeting note.
pub fn sample_library() -> Vec<ProcessedDocument> {
    vec![
        DocumentBuilder::new()
            .file_name("invoice-2023-11.pdf")
            .mime_type("application/pdf")
            .text("Invoice for November consulting services. Total due: 4,200 EUR.")
            .tag("finance")
            .days_old(30)
            .build(),
        DocumentBuilder::new()
            .file_name("invoice-2023-12.pdf")
            .mime_type("application/pdf")
            .text("Invoice for December consulting services. Total due: 3,900 EUR.")
            .tag("finance")
            .days_old(1)
            .build(),
        DocumentBuilder::new()
            .file_name("roadmap.md")
            .mime_type("text/markdown")
            .text("Product roadmap: search improvements, offline cache, mobile app.")
            .summary("Plans for the next two quarters")
            .topic("planning")
            .days_old(10)
            .build(),
        DocumentBuilder::new()
            .file_name("standup-notes.txt")
            .text("Discussed the invoice export bug and the search cache TTL.")
            .days_old(2)
            .build(),
    ]
}

//! Docsift driver: ingests text files into the document store and runs queries against it.
//!
//! ```text
//! docsift [--add PATH]... [QUERY]...
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use mimalloc::MiMalloc;

use docsift::cache::SearchCacheHandle;
use docsift::config::Config;
use docsift::document::{DocumentStore, FileDocumentStore, ProcessedDocument, ProcessingStatus};
use docsift::search::{KeywordSearchService, MemorySearchIntelligence};
use docsift::searcher::DocumentSearcher;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Debug, Default)]
struct Args {
    add: Vec<PathBuf>,
    queries: Vec<String>,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> anyhow::Result<Self> {
        let mut parsed = Self::default();
        while let Some(arg) = args.next() {
            if arg == "--add" {
                let path = args.next().context("--add requires a path")?;
                parsed.add.push(PathBuf::from(path));
            } else {
                parsed.queries.push(arg);
            }
        }
        Ok(parsed)
    }
}

fn mime_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("md" | "markdown") => "text/markdown",
        Some("json") => "application/json",
        Some("csv") => "text/csv",
        _ => "text/plain",
    }
}

/// Reads a text file and walks it through the processing pipeline to `Ready`.
fn ingest(path: &Path) -> anyhow::Result<ProcessedDocument> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let mut doc = ProcessedDocument::new(file_name, mime_for(path), text.len() as u64);
    doc.transition(ProcessingStatus::Uploading)?;
    doc.transition(ProcessingStatus::Processing)?;
    doc.set_extracted_text(text);
    doc.transition(ProcessingStatus::Analyzing)?;
    doc.transition(ProcessingStatus::Ready)?;
    Ok(doc)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse(std::env::args().skip(1))?;

    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!(
        store_path = %config.store_path.display(),
        cache_ttl_secs = config.cache_ttl.as_secs(),
        cache_max_entries = config.cache_max_entries,
        "Docsift starting"
    );

    let store = Arc::new(FileDocumentStore::open(config.store_path.clone())?);
    let removed = store.cleanup_expired(config.document_ttl, Utc::now())?;
    tracing::info!(documents = store.len(), removed, "Document store loaded");

    for path in &args.add {
        let doc = ingest(path)?;
        tracing::info!(id = %doc.id, name = %doc.file_name, "Document added");
        store.put(doc)?;
    }

    if args.queries.is_empty() {
        tracing::info!("No queries given");
        return Ok(());
    }

    let cache = SearchCacheHandle::with_config(config.cache_config())?;
    let intelligence = Arc::new(MemorySearchIntelligence::new());
    let searcher = DocumentSearcher::new(
        KeywordSearchService::new(),
        store,
        cache,
        config.searcher_config(),
    )
    .with_intelligence(intelligence);

    for query in &args.queries {
        // Second pass is served from the cache.
        for _ in 0..2 {
            match searcher.search(query).await {
                Ok(Some(results)) => {
                    let state = searcher.state();
                    tracing::info!(
                        query = %results.query,
                        total = results.total_count,
                        status = ?state.last_status,
                        "Search complete"
                    );
                    for m in &results.matches {
                        tracing::info!(
                            name = %m.document_name,
                            score = m.score,
                            snippet = m.snippet.as_deref().unwrap_or(""),
                            "Match"
                        );
                    }
                }
                Ok(None) => {
                    tracing::warn!(query = %query, "Query too short, skipped");
                    break;
                }
                Err(e) => {
                    tracing::warn!(query = %query, error = %e, "Search failed");
                    break;
                }
            }
        }
    }

    let analytics = searcher.analytics().await?;
    let stats = searcher.cache().stats();
    tracing::info!(
        searches = analytics.total_searches,
        cached = analytics.cached_searches,
        hit_rate = stats.hit_rate(),
        "Docsift done"
    );
    Ok(())
}

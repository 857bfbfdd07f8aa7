//! Batch processing of content documents.
//!
//! Each document is independent, so the batch fans out over a rayon worker
//! pool. Workers share only the read-only hyphenation dictionary; every
//! document is parsed, rewritten, and serialized entirely on one worker, and
//! only plain bytes cross threads. Output order always matches input order.

use log::{debug, warn};
use rayon::prelude::*;

use crate::hyphen::Dictionary;
use crate::rewrite::{rewrite_html, Options};
use crate::util::decode_text;

/// One content document handed in by the package layer.
#[derive(Debug, Clone)]
pub struct ContentDocument {
    /// Path of the document inside the package.
    pub href: String,
    /// Raw bytes as stored in the package.
    pub data: Vec<u8>,
}

/// What happened to one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentStatus {
    /// The document was rewritten successfully.
    Rewritten,
    /// The document could not be processed; its original bytes were kept.
    Failed(String),
}

/// Per-document result, one-to-one and in order with the input.
#[derive(Debug, Clone)]
pub struct DocumentOutcome {
    pub href: String,
    /// Rewritten bytes, or the untouched original on failure.
    pub data: Vec<u8>,
    pub status: DocumentStatus,
}

/// Summary of one batch run.
#[derive(Debug)]
pub struct BatchSummary {
    /// Hyphenation language tag the batch ran with, when the caller
    /// resolved one (the package layer fills this in).
    pub language: Option<String>,
    pub outcomes: Vec<DocumentOutcome>,
}

impl BatchSummary {
    /// Number of documents rewritten successfully.
    pub fn rewritten(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == DocumentStatus::Rewritten)
            .count()
    }

    /// Number of documents that passed through unmodified due to a failure.
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.rewritten()
    }

    pub fn all_ok(&self) -> bool {
        self.failed() == 0
    }
}

/// Rewrite every document, in parallel, never aborting the batch.
///
/// A failure (undecodable bytes, unparseable markup) is recorded in that
/// document's [`DocumentStatus`] and its original bytes pass through
/// unmodified; every other document is still processed.
pub fn process_all(
    documents: Vec<ContentDocument>,
    dictionary: &Dictionary,
    options: &Options,
) -> BatchSummary {
    let outcomes = documents
        .into_par_iter()
        .map(|doc| match rewrite_document(&doc.data, dictionary, options) {
            Ok(data) => {
                debug!("rewrote {}", doc.href);
                DocumentOutcome {
                    href: doc.href,
                    data,
                    status: DocumentStatus::Rewritten,
                }
            }
            Err(e) => {
                warn!("leaving {} unmodified: {e}", doc.href);
                DocumentOutcome {
                    href: doc.href,
                    status: DocumentStatus::Failed(e.to_string()),
                    data: doc.data,
                }
            }
        })
        .collect();

    BatchSummary {
        language: None,
        outcomes,
    }
}

/// Rewrite a single document's bytes. Each call builds and tears down its
/// own DOM; nothing is shared with other documents.
pub fn rewrite_document(
    data: &[u8],
    dictionary: &Dictionary,
    options: &Options,
) -> crate::Result<Vec<u8>> {
    let text = decode_text(data)?;
    let rewritten = rewrite_html(&text, dictionary, options);
    Ok(rewritten.into_bytes())
}

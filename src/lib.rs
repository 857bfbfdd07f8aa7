//! # sylla
//!
//! Rewrites the text of an EPUB so that alternating syllables are visually
//! emphasized (2nd, 4th, ... per word by default), a rhythmic cue that helps
//! some readers keep their place in a line.
//!
//! ## Features
//!
//! - Splits words with Knuth-Liang hyphenation patterns (embedded
//!   dictionaries for 30+ languages, selected by the book's `dc:language`)
//! - Rewrites XHTML content documents in place in the markup tree, leaving
//!   tags, attributes, whitespace, and excluded elements (`pre`, `code`,
//!   `script`, ...) untouched
//! - Repackages the EPUB with all other resources byte-identical
//! - Processes documents in parallel; a bad document is flagged and passed
//!   through rather than failing the book
//!
//! ## Quick Start
//!
//! ```no_run
//! use sylla::{emphasize_epub, Options};
//!
//! let summary = emphasize_epub("input.epub", "output.epub", &Options::default())?;
//! println!("{} documents rewritten, {} failed", summary.rewritten(), summary.failed());
//! # Ok::<(), sylla::Error>(())
//! ```
//!
//! ## Working with markup directly
//!
//! The pipeline stages are exposed individually: [`segment`] splits a text
//! run into words and separators, [`emphasize`] turns one word into flagged
//! syllable spans, and [`rewrite_html`] applies the whole transformation to
//! a markup document.
//!
//! ```
//! use sylla::{rewrite_html, Dictionary, Options};
//!
//! let dict = Dictionary::load("en");
//! let html = rewrite_html("<p>information</p>", &dict, &Options::default());
//! ```

pub mod batch;
pub mod emphasis;
pub mod epub;
pub mod error;
pub mod hyphen;
pub mod rewrite;
pub mod segment;
pub(crate) mod util;

pub use batch::{
    process_all, rewrite_document, BatchSummary, ContentDocument, DocumentOutcome, DocumentStatus,
};
pub use emphasis::{emphasize, Parity, Span};
pub use epub::{emphasize_epub, read_package, write_package, Package, PackageEntry};
pub use error::{Error, Result};
pub use hyphen::{Dictionary, Syllables};
pub use rewrite::{default_excluded_tags, rewrite_html, Options};
pub use segment::{segment, Piece};

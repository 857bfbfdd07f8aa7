//! EPUB container handling: locating content documents, rewriting them, and
//! repackaging the archive with every other resource byte-identical.

mod reader;
mod writer;

pub use reader::{read_package, read_package_from_reader, Package, PackageEntry};
pub use writer::{write_package, write_package_to_writer};

use std::path::Path;

use log::info;

use crate::batch::{process_all, BatchSummary, ContentDocument};
use crate::error::Result;
use crate::hyphen::Dictionary;
use crate::rewrite::Options;

/// Rewrite every content document of an EPUB and write the result.
///
/// The hyphenation language is taken from `options.language` when set,
/// otherwise from the package's `dc:language`, otherwise `"en"`. Documents
/// that cannot be processed pass through unmodified and are flagged in the
/// returned [`BatchSummary`]; the output archive is always written.
///
/// # Example
///
/// ```no_run
/// use sylla::{emphasize_epub, Options};
///
/// let summary = emphasize_epub("book.epub", "book_syllables.epub", &Options::default())?;
/// println!("rewrote {} documents", summary.rewritten());
/// # Ok::<(), sylla::Error>(())
/// ```
pub fn emphasize_epub<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    options: &Options,
) -> Result<BatchSummary> {
    let mut package = read_package(input)?;

    let language = options
        .language
        .clone()
        .or_else(|| package.language.clone())
        .unwrap_or_else(|| "en".to_string());
    info!("hyphenation language: {language}");
    let dictionary = Dictionary::load(&language);

    let mut indices = Vec::new();
    let mut documents = Vec::new();
    for (index, entry) in package.entries.iter().enumerate() {
        if entry.is_content {
            indices.push(index);
            documents.push(ContentDocument {
                href: entry.name.clone(),
                data: entry.data.clone(),
            });
        }
    }
    info!(
        "{} content documents out of {} entries",
        documents.len(),
        package.entries.len()
    );

    let mut summary = process_all(documents, &dictionary, options);
    summary.language = Some(language);
    for (&index, outcome) in indices.iter().zip(&summary.outcomes) {
        package.entries[index].data = outcome.data.clone();
    }

    write_package(&package.entries, output)?;
    info!(
        "rewrote {} of {} documents",
        summary.rewritten(),
        summary.outcomes.len()
    );
    Ok(summary)
}

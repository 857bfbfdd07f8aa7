use std::io::{Seek, Write};
use std::path::Path;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use super::reader::PackageEntry;
use crate::error::Result;

/// Write package entries to an EPUB file on disk.
///
/// Entries are written in the order given, except `mimetype`, which is
/// always first and stored uncompressed so readers can sniff the container
/// type. Entry bytes are written as-is; nothing else about the archive is
/// altered.
pub fn write_package<P: AsRef<Path>>(entries: &[PackageEntry], path: P) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_package_to_writer(entries, file)
}

/// Write package entries to any [`Write`] + [`Seek`] destination.
pub fn write_package_to_writer<W: Write + Seek>(entries: &[PackageEntry], writer: W) -> Result<()> {
    let mut zip = ZipWriter::new(writer);

    let options_stored =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    let options_deflate =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    // mimetype must be first and uncompressed
    zip.start_file("mimetype", options_stored)?;
    match entries.iter().find(|entry| entry.name == "mimetype") {
        Some(entry) => zip.write_all(&entry.data)?,
        None => zip.write_all(b"application/epub+zip")?,
    }

    for entry in entries {
        if entry.name == "mimetype" {
            continue;
        }
        zip.start_file(entry.name.as_str(), options_deflate)?;
        zip.write_all(&entry.data)?;
    }

    zip.finish()?;
    Ok(())
}

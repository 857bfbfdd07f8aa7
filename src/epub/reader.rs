use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::HashSet;
use std::io::{Read, Seek};
use std::path::Path;
use zip::ZipArchive;

use log::warn;

use crate::error::{Error, Result};

/// Media types whose entries are rewritable content documents.
const CONTENT_MEDIA_TYPES: &[&str] = &["application/xhtml+xml", "text/html"];

/// An opened EPUB container, entries in archive order.
#[derive(Debug)]
pub struct Package {
    /// The package's `dc:language`, when declared.
    pub language: Option<String>,
    pub entries: Vec<PackageEntry>,
}

/// One archive entry.
#[derive(Debug, Clone)]
pub struct PackageEntry {
    /// Path inside the archive.
    pub name: String,
    pub data: Vec<u8>,
    /// Whether this entry is a content document per the OPF manifest.
    pub is_content: bool,
}

/// Read an EPUB file from disk.
///
/// Locates the OPF package document via `META-INF/container.xml`, then loads
/// every archive entry, classifying manifest items with an XHTML/HTML media
/// type as content documents.
pub fn read_package<P: AsRef<Path>>(path: P) -> Result<Package> {
    let file = std::fs::File::open(path)?;
    read_package_from_reader(file)
}

/// Read an EPUB from any [`Read`] + [`Seek`] source.
pub fn read_package_from_reader<R: Read + Seek>(reader: R) -> Result<Package> {
    let mut archive = ZipArchive::new(reader)?;

    let opf_path = find_opf_path(&mut archive)?;
    let opf_dir = Path::new(&opf_path)
        .parent()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_default();

    let opf_content = read_archive_file(&mut archive, &opf_path)?;
    let (language, content_hrefs) = parse_opf(&opf_content)?;

    let mut content_paths: HashSet<String> = HashSet::new();
    for href in &content_hrefs {
        let full = resolve_path(&opf_dir, href);
        if let Ok(decoded) = percent_encoding::percent_decode_str(&full).decode_utf8() {
            content_paths.insert(decoded.into_owned());
        }
        content_paths.insert(full);
    }

    let mut entries = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let mut file = archive.by_index(index)?;
        if file.is_dir() {
            continue;
        }
        let name = file.name().to_string();
        let mut data = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut data)?;

        if name == "mimetype" && data != b"application/epub+zip" {
            warn!(
                "unexpected mimetype entry: {}",
                String::from_utf8_lossy(&data)
            );
        }

        let is_content = content_paths.contains(&name);
        entries.push(PackageEntry {
            name,
            data,
            is_content,
        });
    }

    Ok(Package { language, entries })
}

fn find_opf_path<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<String> {
    let container = read_archive_file(archive, "META-INF/container.xml")?;

    let mut reader = Reader::from_str(&container);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"rootfile" => {
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"full-path" {
                        return Ok(String::from_utf8(attr.value.to_vec())?);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }

    Err(Error::InvalidEpub(
        "No rootfile found in container.xml".into(),
    ))
}

/// Extract `dc:language` and the hrefs of all content documents from the
/// OPF package document.
fn parse_opf(content: &str) -> Result<(Option<String>, Vec<String>)> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut language: Option<String> = None;
    let mut content_hrefs: Vec<String> = Vec::new();
    let mut in_language = false;
    let mut buf_text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if local_name(e.name().as_ref()) == b"language" {
                    in_language = true;
                    buf_text.clear();
                }
            }
            Ok(Event::Empty(e)) => {
                if local_name(e.name().as_ref()) == b"item" {
                    let mut href = String::new();
                    let mut media_type = String::new();
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"href" => href = String::from_utf8(attr.value.to_vec())?,
                            b"media-type" => media_type = String::from_utf8(attr.value.to_vec())?,
                            _ => {}
                        }
                    }
                    if !href.is_empty() && CONTENT_MEDIA_TYPES.contains(&media_type.as_str()) {
                        content_hrefs.push(href);
                    }
                }
            }
            Ok(Event::Text(e)) => {
                if in_language {
                    buf_text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::End(e)) => {
                if in_language && local_name(e.name().as_ref()) == b"language" {
                    let tag = buf_text.trim();
                    if !tag.is_empty() && language.is_none() {
                        language = Some(tag.to_string());
                    }
                    in_language = false;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }

    Ok((language, content_hrefs))
}

fn read_archive_file<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<String> {
    let bytes = read_archive_file_bytes(archive, path)?;
    let bytes = strip_bom(&bytes);
    Ok(String::from_utf8(bytes.to_vec())?)
}

fn read_archive_file_bytes<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &str,
) -> Result<Vec<u8>> {
    // Try direct lookup first
    match archive.by_name(path) {
        Ok(mut file) => {
            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;
            return Ok(contents);
        }
        Err(zip::result::ZipError::FileNotFound) => {}
        Err(e) => return Err(e.into()),
    }

    // Fallback: try percent-decoded path (handles malformed EPUBs)
    let decoded = percent_encoding::percent_decode_str(path)
        .decode_utf8()
        .map_err(|_| Error::InvalidEpub(format!("Invalid UTF-8 in path: {}", path)))?;

    let mut file = archive.by_name(&decoded)?;
    let mut contents = Vec::new();
    file.read_to_end(&mut contents)?;
    Ok(contents)
}

/// Strip UTF-8 BOM (byte order mark) if present
fn strip_bom(data: &[u8]) -> &[u8] {
    if data.starts_with(&[0xEF, 0xBB, 0xBF]) {
        &data[3..]
    } else {
        data
    }
}

fn resolve_path(base: &str, href: &str) -> String {
    if base.is_empty() {
        href.to_string()
    } else {
        format!("{}/{}", base, href)
    }
}

/// Extract local name from potentially namespaced XML name
fn local_name(name: &[u8]) -> &[u8] {
    name.iter()
        .rposition(|&b| b == b':')
        .map(|i| &name[i + 1..])
        .unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_name() {
        assert_eq!(local_name(b"dc:language"), b"language");
        assert_eq!(local_name(b"language"), b"language");
        assert_eq!(local_name(b"opf:item"), b"item");
    }

    #[test]
    fn test_parse_opf_language_and_content() {
        let opf = r#"<?xml version="1.0"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:title>Probe</dc:title>
    <dc:language>de</dc:language>
  </metadata>
  <manifest>
    <item id="ch1" href="ch1.xhtml" media-type="application/xhtml+xml"/>
    <item id="css" href="style.css" media-type="text/css"/>
    <item id="img" href="cover.jpg" media-type="image/jpeg"/>
    <item id="ch2" href="ch2.xhtml" media-type="application/xhtml+xml"/>
  </manifest>
</package>"#;
        let (language, hrefs) = parse_opf(opf).unwrap();
        assert_eq!(language.as_deref(), Some("de"));
        assert_eq!(hrefs, vec!["ch1.xhtml", "ch2.xhtml"]);
    }

    #[test]
    fn test_resolve_path() {
        assert_eq!(resolve_path("", "ch1.xhtml"), "ch1.xhtml");
        assert_eq!(resolve_path("OEBPS", "ch1.xhtml"), "OEBPS/ch1.xhtml");
    }
}

//! Shared helpers for content document decoding.

use crate::error::{Error, Result};

/// Decode a content document's bytes to a string.
///
/// 1. First tries UTF-8 (handles BOM automatically via encoding_rs)
/// 2. If malformed, tries the encoding declared in the document itself
///    (`<?xml encoding="..."?>` or `<meta charset=...>`)
/// 3. Otherwise reports the document as malformed
///
/// There is deliberately no lossy fallback: a document we cannot decode
/// faithfully must pass through the pipeline byte-identical, so decoding
/// failure is surfaced to the caller instead of papered over.
pub(crate) fn decode_text(bytes: &[u8]) -> Result<String> {
    // Try UTF-8 first (handles BOM automatically)
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);
    if !malformed {
        return Ok(result.into_owned());
    }

    if let Some(name) = declared_encoding(bytes)
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, malformed) = encoding.decode(bytes);
        if !malformed {
            return Ok(result.into_owned());
        }
    }

    Err(Error::MalformedDocument(
        "content is neither valid UTF-8 nor its declared encoding".to_string(),
    ))
}

/// Find an encoding name declared in the first kilobyte of the document.
///
/// Looks for `encoding="..."` (XML declaration) and `charset=...` (HTML
/// meta). The header is scanned as ASCII, which every declarable encoding
/// is compatible with.
fn declared_encoding(bytes: &[u8]) -> Option<String> {
    let head: String = bytes
        .iter()
        .take(1024)
        .map(|&b| if b.is_ascii() { b as char } else { '\u{fffd}' })
        .collect();
    let head = head.to_ascii_lowercase();

    for key in ["encoding=", "charset="] {
        if let Some(pos) = head.find(key) {
            let rest = &head[pos + key.len()..];
            let rest = rest.trim_start_matches(['"', '\'']);
            let end = rest
                .find(|c: char| c == '"' || c == '\'' || c == '>' || c.is_whitespace())
                .unwrap_or(rest.len());
            if end > 0 {
                return Some(rest[..end].to_string());
            }
        }
    }
    None
}

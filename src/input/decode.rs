//! File upload decoding.
//!
//! Plain text, HTML, DOCX and EPUB are decoded here. DOCX and EPUB are ZIP
//! containers; their XML is read with quick-xml.

use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::result::ZipError;
use zip::ZipArchive;

use super::html::strip_html;
use super::{IngestError, Result};

/// Decode an uploaded file to text, dispatching on its extension.
pub fn decode_upload(file_name: &str, bytes: &[u8]) -> Result<String> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    log::debug!("Decoding {} ({} bytes) as .{}", file_name, bytes.len(), ext);

    match ext.as_str() {
        "txt" | "text" | "md" => Ok(String::from_utf8_lossy(bytes).into_owned()),
        "html" | "htm" | "mht" | "mhtml" => Ok(strip_html(&String::from_utf8_lossy(bytes))),
        "docx" => decode_docx(bytes),
        "epub" => decode_epub(bytes),
        "pdf" => Err(IngestError::DecoderUnavailable("PDF text extraction".to_string())),
        "png" | "jpg" | "jpeg" => Err(IngestError::DecoderUnavailable("OCR".to_string())),
        "mp3" | "wav" => Err(IngestError::DecoderUnavailable("speech recognition".to_string())),
        _ => Err(IngestError::UnsupportedFormat(ext)),
    }
}

/// Paragraph text of a DOCX document, one paragraph per line.
pub fn decode_docx(bytes: &[u8]) -> Result<String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let xml = read_entry(&mut archive, "word/document.xml")?;

    let mut reader = Reader::from_str(&xml);
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_text = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => {
                    let paragraph = current.trim();
                    if !paragraph.is_empty() {
                        paragraphs.push(paragraph.to_string());
                    }
                    current.clear();
                }
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => current.push('\t'),
                b"w:br" => current.push('\n'),
                _ => {}
            },
            Event::Text(e) if in_text => {
                current.push_str(&e.unescape().unwrap_or_default());
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let tail = current.trim();
    if !tail.is_empty() {
        paragraphs.push(tail.to_string());
    }

    Ok(paragraphs.join("\n"))
}

/// Text of an EPUB, chapters in reading order separated by blank lines.
///
/// Reading order comes from the OPF spine; books without a usable spine fall
/// back to every (X)HTML entry sorted by path.
pub fn decode_epub(bytes: &[u8]) -> Result<String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let documents = match epub_spine(&mut archive)? {
        Some(paths) if !paths.is_empty() => paths,
        _ => {
            let mut paths: Vec<String> = archive
                .file_names()
                .filter(|name| {
                    let lower = name.to_lowercase();
                    lower.ends_with(".xhtml") || lower.ends_with(".html") || lower.ends_with(".htm")
                })
                .map(|name| name.to_string())
                .collect();
            paths.sort();
            paths
        }
    };

    let mut sections = Vec::new();
    for path in documents {
        match read_entry(&mut archive, &path) {
            Ok(xhtml) => {
                let text = strip_html(&xhtml);
                if !text.is_empty() {
                    sections.push(text);
                }
            }
            Err(IngestError::MissingEntry(name)) => {
                log::warn!("EPUB spine references missing entry {}", name);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(sections.join("\n\n"))
}

/// Content document paths listed in the spine, resolved against the OPF
/// location. `None` when the container or package file cannot be located.
fn epub_spine<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Option<Vec<String>>> {
    let container = match read_entry(archive, "META-INF/container.xml") {
        Ok(content) => content,
        Err(IngestError::MissingEntry(_)) => return Ok(None),
        Err(e) => return Err(e),
    };

    let Some(opf_path) = rootfile_path(&container)? else {
        return Ok(None);
    };
    let opf = match read_entry(archive, &opf_path) {
        Ok(content) => content,
        Err(IngestError::MissingEntry(_)) => return Ok(None),
        Err(e) => return Err(e),
    };

    let base = match opf_path.rfind('/') {
        Some(idx) => &opf_path[..=idx],
        None => "",
    };

    let mut manifest: HashMap<String, String> = HashMap::new();
    let mut spine: Vec<String> = Vec::new();

    let mut reader = Reader::from_str(&opf);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"item" => {
                    if let (Some(id), Some(href)) = (attribute(&e, b"id"), attribute(&e, b"href")) {
                        manifest.insert(id, href);
                    }
                }
                b"itemref" => {
                    if let Some(idref) = attribute(&e, b"idref") {
                        spine.push(idref);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(Some(
        spine
            .iter()
            .filter_map(|id| manifest.get(id))
            .map(|href| format!("{}{}", base, href))
            .collect(),
    ))
}

fn rootfile_path(container: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(container);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"rootfile" => {
                return Ok(attribute(&e, b"full-path"));
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

fn attribute(element: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
}

fn read_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<String> {
    let mut file = archive.by_name(name).map_err(|e| match e {
        ZipError::FileNotFound => IngestError::MissingEntry(name.to_string()),
        other => IngestError::Zip(other),
    })?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

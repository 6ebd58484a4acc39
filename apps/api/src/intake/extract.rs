//! Text extraction for uploaded resumes (PDF, DOCX, TXT).
//!
//! Callers supply raw bytes plus the detected [`ResumeFormat`]; this module returns plain
//! UTF-8 text. Extraction never panics outward: a failing file becomes an [`ExtractError`]
//! and the upload pipeline skips it.

use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use thiserror::Error;

use crate::intake::formats::ResumeFormat;

/// Maximum decompressed bytes read from `word/document.xml` (zip-bomb protection).
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;
const DOCX_BODY_ENTRY: &str = "word/document.xml";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("DOCX extraction failed: {0}")]
    Docx(String),

    #[error("File is not valid UTF-8 text: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No text could be extracted")]
    NoText,
}

/// Extracts plain text from an in-memory resume.
pub fn extract_text(bytes: &[u8], format: ResumeFormat) -> Result<String, ExtractError> {
    match format {
        ResumeFormat::Pdf => extract_pdf(bytes),
        ResumeFormat::Docx => extract_docx(bytes),
        ResumeFormat::Txt => extract_txt(bytes),
    }
}

/// Reads a resume from disk and dispatches on its extension.
#[cfg_attr(not(test), allow(dead_code))]
pub fn extract_from_path(path: &Path) -> Result<String, ExtractError> {
    let name = path.to_string_lossy();
    let format = ResumeFormat::from_filename(&name)
        .ok_or_else(|| ExtractError::UnsupportedFormat(name.to_string()))?;
    let bytes = std::fs::read(path)?;
    extract_text(&bytes, format)
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    // pdf-extract panics on some malformed documents instead of returning an error.
    match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(ExtractError::Pdf(e.to_string())),
        Err(_) => Err(ExtractError::Pdf("malformed PDF".to_string())),
    }
}

fn extract_txt(bytes: &[u8]) -> Result<String, ExtractError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    Ok(String::from_utf8(bytes.to_vec())?)
}

fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| ExtractError::Docx(e.to_string()))?;
    let entry = archive
        .by_name(DOCX_BODY_ENTRY)
        .map_err(|_| ExtractError::Docx(format!("{DOCX_BODY_ENTRY} not found")))?;

    let mut doc_xml = Vec::new();
    entry
        .take(MAX_XML_ENTRY_BYTES)
        .read_to_end(&mut doc_xml)
        .map_err(|e| ExtractError::Docx(e.to_string()))?;
    if doc_xml.len() as u64 >= MAX_XML_ENTRY_BYTES {
        return Err(ExtractError::Docx(format!(
            "{DOCX_BODY_ENTRY} exceeds size limit ({MAX_XML_ENTRY_BYTES} bytes)"
        )));
    }

    paragraphs_from_document_xml(&doc_xml)
}

/// Collects `w:t` runs, ending each `w:p` paragraph with a newline.
fn paragraphs_from_document_xml(xml: &[u8]) -> Result<String, ExtractError> {
    let mut out = String::new();
    let mut reader = quick_xml::Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" => in_text_run = true,
            Ok(Event::Text(te)) if in_text_run => {
                let text = te
                    .unescape()
                    .map_err(|e| ExtractError::Docx(e.to_string()))?;
                out.push_str(&text);
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text_run = false,
                b"p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"tab" => out.push('\t'),
                b"br" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExtractError::Docx(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(out)
}

// Resume intake: turns uploaded files into plain text and heuristic structure.
// No network calls happen here; everything is local and deterministic.

pub mod extract;
pub mod formats;
pub mod parser;

use serde::Serialize;
use uuid::Uuid;

use crate::intake::extract::{extract_text, ExtractError};
use crate::intake::formats::ResumeFormat;
use crate::intake::parser::{parse_resume, ParsedResume};

/// A resume whose text has been extracted and parsed, ready for ranking.
#[derive(Debug, Clone)]
pub struct ProcessedResume {
    pub id: Uuid,
    pub filename: String,
    pub file_size: usize,
    pub parsed: ParsedResume,
}

/// An uploaded file left out of the batch, with the reason.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SkippedFile {
    pub filename: String,
    pub reason: String,
}

/// Detects the format, extracts text and parses it.
///
/// Blocking: PDF and DOCX decoding is CPU-bound, so async callers should run this
/// on the blocking pool.
pub fn prepare_resume(filename: &str, bytes: &[u8]) -> Result<ProcessedResume, ExtractError> {
    let format = ResumeFormat::from_filename(filename)
        .ok_or_else(|| ExtractError::UnsupportedFormat(filename.to_string()))?;
    let text = extract_text(bytes, format)?;
    if text.trim().is_empty() {
        return Err(ExtractError::NoText);
    }

    Ok(ProcessedResume {
        id: Uuid::new_v4(),
        filename: filename.to_string(),
        file_size: bytes.len(),
        parsed: parse_resume(&text),
    })
}

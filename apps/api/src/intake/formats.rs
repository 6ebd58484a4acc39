use std::path::Path;

use serde::Serialize;

/// File types a resume may be uploaded as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResumeFormat {
    Pdf,
    Docx,
    Txt,
}

impl ResumeFormat {
    /// Detects the format from the file extension, case-insensitively.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())?
            .to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(ResumeFormat::Pdf),
            "docx" => Some(ResumeFormat::Docx),
            "txt" => Some(ResumeFormat::Txt),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ResumeFormat::Pdf => ".pdf",
            ResumeFormat::Docx => ".docx",
            ResumeFormat::Txt => ".txt",
        }
    }
}

pub fn supported_formats() -> [&'static str; 3] {
    [
        ResumeFormat::Pdf.extension(),
        ResumeFormat::Docx.extension(),
        ResumeFormat::Txt.extension(),
    ]
}

pub fn validate_file_format(filename: &str) -> bool {
    ResumeFormat::from_filename(filename).is_some()
}

pub fn file_size_mb(bytes: usize) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_formats_list() {
        assert_eq!(supported_formats(), [".pdf", ".docx", ".txt"]);
    }

    #[test]
    fn test_format_detection_is_case_insensitive() {
        assert_eq!(ResumeFormat::from_filename("Jane_CV.PDF"), Some(ResumeFormat::Pdf));
        assert_eq!(ResumeFormat::from_filename("cv.Docx"), Some(ResumeFormat::Docx));
        assert_eq!(ResumeFormat::from_filename("notes.txt"), Some(ResumeFormat::Txt));
    }

    #[test]
    fn test_unsupported_and_missing_extensions() {
        assert!(!validate_file_format("resume.doc"));
        assert!(!validate_file_format("resume"));
        assert!(!validate_file_format(".pdf.exe"));
        assert!(validate_file_format("archive.tar.txt"));
    }

    #[test]
    fn test_file_size_mb() {
        assert_eq!(file_size_mb(0), 0.0);
        assert!((file_size_mb(1024 * 1024 * 3) - 3.0).abs() < f64::EPSILON);
        assert!((file_size_mb(512 * 1024) - 0.5).abs() < f64::EPSILON);
    }
}

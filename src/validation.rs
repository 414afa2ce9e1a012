//! Input-shape validation applied at the request surface, before any
//! document bytes reach the normalizer.

use std::path::Path;

use crate::error::{AvatarError, Result};

/// Only the portable document format is accepted for uploads.
pub fn ensure_pdf_filename(filename: &str) -> Result<()> {
    let is_pdf = Path::new(filename)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if is_pdf {
        Ok(())
    } else {
        Err(AvatarError::UnsupportedDocument {
            filename: filename.to_string(),
            reason: "only .pdf uploads are accepted".to_string(),
        })
    }
}

pub fn ensure_within_size(filename: &str, len: usize, max_bytes: usize) -> Result<()> {
    if len > max_bytes {
        return Err(AvatarError::InvalidInput(format!(
            "File '{filename}' exceeds the {max_bytes} byte upload limit"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_extension_accepted_case_insensitively() {
        assert!(ensure_pdf_filename("deposition.pdf").is_ok());
        assert!(ensure_pdf_filename("Deposition.PDF").is_ok());
        assert!(ensure_pdf_filename("exhibit b.Pdf").is_ok());
    }

    #[test]
    fn test_other_extensions_rejected() {
        for name in ["notes.docx", "image.png", "report.pdf.exe", "noextension"] {
            let err = ensure_pdf_filename(name).expect_err("non-pdf should be rejected");
            assert!(matches!(err, AvatarError::UnsupportedDocument { .. }));
        }
    }

    #[test]
    fn test_size_limit() {
        assert!(ensure_within_size("a.pdf", 10, 10).is_ok());
        let err = ensure_within_size("a.pdf", 11, 10).expect_err("oversize should fail");
        assert!(matches!(err, AvatarError::InvalidInput(_)));
    }
}

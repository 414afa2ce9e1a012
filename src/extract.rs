//! Input normalizer: merges the free-text query and extracted PDF text into
//! one canonical case description.

use crate::error::{AvatarError, Result};
use crate::models::{CaseInput, DocumentFailure, NormalizedCaseText};

/// Normalize a request's input into a single case description.
///
/// Documents are processed in upload order; a document that fails text
/// extraction is recorded in `failed_documents` and the rest proceed. The
/// request only fails outright when nothing usable remains.
pub fn normalize(input: &CaseInput) -> Result<NormalizedCaseText> {
    let query = input
        .text_query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty());

    if query.is_none() && input.documents.is_empty() {
        return Err(AvatarError::InvalidInput(
            "Provide a text_query, at least one PDF document, or both".to_string(),
        ));
    }

    let mut sections: Vec<String> = Vec::new();
    let mut source_filenames = Vec::new();
    let mut failed_documents = Vec::new();

    // Query always comes first so its position is stable across requests.
    if let Some(q) = query {
        sections.push(q.to_string());
    }

    for doc in &input.documents {
        match extract_document_text(&doc.bytes) {
            Ok(text) => {
                sections.push(render_document_section(&doc.filename, &text));
                source_filenames.push(doc.filename.clone());
            }
            Err(reason) => {
                tracing::warn!(filename = %doc.filename, %reason, "Document extraction failed");
                failed_documents.push(DocumentFailure {
                    filename: doc.filename.clone(),
                    reason,
                });
            }
        }
    }

    if sections.is_empty() {
        // Every document failed and there was no query to fall back on.
        let failed_names: Vec<&str> = failed_documents
            .iter()
            .map(|f| f.filename.as_str())
            .collect();
        return Err(AvatarError::UnsupportedDocument {
            filename: failed_names.join(", "),
            reason: "no text could be extracted from any uploaded document".to_string(),
        });
    }

    Ok(NormalizedCaseText {
        text: sections.join("\n\n"),
        source_filenames,
        failed_documents,
    })
}

fn extract_document_text(bytes: &[u8]) -> std::result::Result<String, String> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| format!("not a parseable PDF: {e}"))?;
    let text = text.trim();
    if text.is_empty() {
        return Err("document contains no extractable text".to_string());
    }
    Ok(text.to_string())
}

/// Prefix each document's text with a header naming its source so the
/// persona generator can attribute content.
fn render_document_section(filename: &str, text: &str) -> String {
    format!("--- Document: {filename} ---\n{text}")
}

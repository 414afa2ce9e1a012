use serde::{Deserialize, Serialize};

/// A single uploaded case document, held in memory for the lifetime of the
/// request.
#[derive(Debug, Clone)]
pub struct CaseDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Raw request input: an optional free-text query plus zero or more uploaded
/// documents in upload order. At least one of the two must be non-empty;
/// the normalizer enforces this.
#[derive(Debug, Clone, Default)]
pub struct CaseInput {
    pub text_query: Option<String>,
    pub documents: Vec<CaseDocument>,
}

/// A document the normalizer could not extract text from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentFailure {
    pub filename: String,
    pub reason: String,
}

/// Case description after merging the free-text query and extracted document
/// text. Derived deterministically from `CaseInput`.
#[derive(Debug, Clone)]
pub struct NormalizedCaseText {
    pub text: String,
    /// Filenames whose text made it into `text`, in upload order.
    pub source_filenames: Vec<String>,
    /// Documents that failed extraction, reported rather than dropped.
    pub failed_documents: Vec<DocumentFailure>,
}

/// Persona prose produced by the chat provider.
#[derive(Debug, Clone)]
pub struct PersonaResult {
    pub persona_text: String,
    pub model: String,
    /// True when the case text was clamped to fit the provider's input
    /// budget. Never silent: the orchestrator reports this in the outcome.
    pub truncated: bool,
}

/// Headshot reference produced by the image provider. The URL points at the
/// provider's hosted image; nothing is re-hosted locally.
#[derive(Debug, Clone)]
pub struct AvatarResult {
    pub image_url: String,
    pub model: String,
}

/// Which provider models served the request, echoed for auditability.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelsUsed {
    pub chat: String,
    pub image: String,
}

/// Successful pipeline result, serialized as the `data` field of the
/// create-avatar response.
#[derive(Debug, Clone, Serialize)]
pub struct AvatarOutcome {
    pub avatar_id: String,
    pub persona: String,
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub files_processed: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files_failed: Vec<DocumentFailure>,
    pub input_truncated: bool,
    pub models_used: ModelsUsed,
    pub created_at: String,
}

// Chat provider wire format (OpenAI-compatible chat completions)

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChatMessage,
}

// Image provider wire format (Together-style image generations)

#[derive(Debug, Serialize, Clone)]
pub struct ImageRequest {
    pub model: String,
    pub prompt: String,
    pub width: u32,
    pub height: u32,
    pub n: u32,
}

#[derive(Debug, Deserialize)]
pub struct ImageResponse {
    pub data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
pub struct ImageData {
    pub url: String,
}

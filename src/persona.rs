use async_trait::async_trait;
use std::sync::Arc;

use crate::error::{AvatarError, Result};
use crate::models::{ChatMessage, ChatRequest, NormalizedCaseText, PersonaResult};
use crate::prompts;
use crate::transport::{ChatTransport, CHAT_PROVIDER};

#[async_trait]
pub trait PersonaGenerator: Send + Sync {
    async fn generate(&self, case: &NormalizedCaseText) -> Result<PersonaResult>;
}

/// Drafts an expert witness persona with a single chat-completion call.
pub struct ChatPersonaGenerator {
    tx: Arc<dyn ChatTransport>,
    model: String,
    max_tokens: u32,
    temperature: f32,
    max_input_chars: usize,
}

impl ChatPersonaGenerator {
    pub fn new(
        tx: Arc<dyn ChatTransport>,
        model: String,
        max_tokens: u32,
        temperature: f32,
        max_input_chars: usize,
    ) -> Self {
        Self {
            tx,
            model,
            max_tokens,
            temperature,
            max_input_chars,
        }
    }
}

#[async_trait]
impl PersonaGenerator for ChatPersonaGenerator {
    async fn generate(&self, case: &NormalizedCaseText) -> Result<PersonaResult> {
        let (case_text, truncated) = clamp_chars(&case.text, self.max_input_chars);
        if truncated {
            tracing::warn!(
                limit = self.max_input_chars,
                "Case text clamped to fit chat provider input budget"
            );
        }

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: prompts::EXPERT_WITNESS_SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompts::expert_witness_user_prompt(case_text),
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self.tx.chat(&request).await?;

        let persona_text = response
            .choices
            .first()
            .map(|choice| choice.message.content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| AvatarError::UpstreamRejected {
                provider: CHAT_PROVIDER,
                reason: "returned no completion text".to_string(),
            })?;

        Ok(PersonaResult {
            persona_text,
            model: self.model.clone(),
            truncated,
        })
    }
}

/// Clamp `text` to at most `max` bytes, backing up to a char boundary.
fn clamp_chars(text: &str, max: usize) -> (&str, bool) {
    if text.len() <= max {
        return (text, false);
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    (&text[..end], true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChatResponse, Choice};
    use std::sync::Mutex;

    // Mock ChatTransport for testing
    struct MockChatTransport {
        responses: Mutex<Vec<ChatResponse>>,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl MockChatTransport {
        fn new(responses: Vec<ChatResponse>) -> Self {
            MockChatTransport {
                responses: Mutex::new(responses),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn last_request(&self) -> ChatRequest {
            self.requests
                .lock()
                .expect("mock mutex should not be poisoned")
                .last()
                .expect("a request should have been sent")
                .clone()
        }
    }

    #[async_trait]
    impl ChatTransport for MockChatTransport {
        async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse> {
            self.requests
                .lock()
                .expect("mock mutex should not be poisoned")
                .push(req.clone());
            let mut responses = self
                .responses
                .lock()
                .expect("mock mutex should not be poisoned");
            if let Some(response) = responses.pop() {
                Ok(response)
            } else {
                Err(AvatarError::Internal("No more mock responses".to_string()))
            }
        }
    }

    fn chat_response(content: &str) -> ChatResponse {
        ChatResponse {
            choices: vec![Choice {
                message: ChatMessage {
                    role: "assistant".to_string(),
                    content: content.to_string(),
                },
            }],
        }
    }

    fn case(text: &str) -> NormalizedCaseText {
        NormalizedCaseText {
            text: text.to_string(),
            source_filenames: vec![],
            failed_documents: vec![],
        }
    }

    #[tokio::test]
    async fn test_persona_generation_basic() {
        let tx = Arc::new(MockChatTransport::new(vec![chat_response(
            "Dr. Jane Smith, board-certified orthopedic surgeon with 20 years of experience.",
        )]));
        let generator = ChatPersonaGenerator::new(
            Arc::clone(&tx) as Arc<dyn ChatTransport>,
            "test-chat-model".to_string(),
            1500,
            0.7,
            12000,
        );

        let result = generator
            .generate(&case("Medical malpractice case"))
            .await
            .expect("generation should succeed");

        assert!(result.persona_text.contains("Dr. Jane Smith"));
        assert_eq!(result.model, "test-chat-model");
        assert!(!result.truncated);

        let sent = tx.last_request();
        assert_eq!(sent.model, "test-chat-model");
        assert_eq!(sent.max_tokens, 1500);
        assert_eq!(sent.messages.len(), 2);
        assert!(sent.messages[1].content.contains("Medical malpractice case"));
    }

    #[tokio::test]
    async fn test_oversized_case_text_flags_truncation() {
        let tx = Arc::new(MockChatTransport::new(vec![chat_response("A persona.")]));
        let generator = ChatPersonaGenerator::new(
            Arc::clone(&tx) as Arc<dyn ChatTransport>,
            "test-chat-model".to_string(),
            1500,
            0.7,
            100,
        );

        let long_case = "deposition transcript ".repeat(50);
        let result = generator
            .generate(&case(&long_case))
            .await
            .expect("generation should succeed");

        assert!(result.truncated);
        let sent = tx.last_request();
        // The prompt template wraps the case text, so only check the case
        // portion was clamped.
        assert!(!sent.messages[1].content.contains(&long_case));
    }

    #[tokio::test]
    async fn test_empty_choices_is_upstream_rejection() {
        let tx = Arc::new(MockChatTransport::new(vec![ChatResponse {
            choices: vec![],
        }]));
        let generator = ChatPersonaGenerator::new(
            tx,
            "test-chat-model".to_string(),
            1500,
            0.7,
            12000,
        );

        let err = generator
            .generate(&case("A case"))
            .await
            .expect_err("empty choices should fail");
        assert!(matches!(err, AvatarError::UpstreamRejected { .. }));
    }

    #[test]
    fn test_clamp_respects_char_boundaries() {
        let text = "ééééé"; // 2 bytes per char
        let (clamped, truncated) = clamp_chars(text, 5);
        assert!(truncated);
        assert_eq!(clamped, "éé");

        let (full, truncated) = clamp_chars("short", 100);
        assert!(!truncated);
        assert_eq!(full, "short");
    }
}

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::{AvatarError, Result};
use crate::models::{AvatarResult, ImageRequest, PersonaResult};
use crate::prompts;
use crate::transport::{ImageTransport, IMAGE_PROVIDER};

/// How much of the persona text feeds the image prompt. Image models want a
/// short visual description, not the full biography.
const SUMMARY_CHARS: usize = 300;

#[async_trait]
pub trait AvatarRenderer: Send + Sync {
    async fn render(&self, persona: &PersonaResult) -> Result<AvatarResult>;
}

/// Renders one headshot per request through the image provider.
pub struct ImageAvatarRenderer {
    tx: Arc<dyn ImageTransport>,
    model: String,
    width: u32,
    height: u32,
}

impl ImageAvatarRenderer {
    pub fn new(tx: Arc<dyn ImageTransport>, model: String, width: u32, height: u32) -> Self {
        Self {
            tx,
            model,
            width,
            height,
        }
    }
}

#[async_trait]
impl AvatarRenderer for ImageAvatarRenderer {
    async fn render(&self, persona: &PersonaResult) -> Result<AvatarResult> {
        let prompt = prompts::avatar_image_prompt(&persona_summary(&persona.persona_text));

        let request = ImageRequest {
            model: self.model.clone(),
            prompt,
            width: self.width,
            height: self.height,
            n: 1,
        };

        let response = self.tx.generate(&request).await?;

        let image_url = response
            .data
            .first()
            .map(|image| image.url.clone())
            .filter(|url| !url.is_empty())
            .ok_or_else(|| AvatarError::UpstreamRejected {
                provider: IMAGE_PROVIDER,
                reason: "returned no image".to_string(),
            })?;

        Ok(AvatarResult {
            image_url,
            model: self.model.clone(),
        })
    }
}

/// First line(s) of the persona clipped to a visual-prompt-sized summary.
fn persona_summary(persona_text: &str) -> String {
    let flattened = persona_text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if flattened.len() <= SUMMARY_CHARS {
        return flattened;
    }
    let mut end = SUMMARY_CHARS;
    while !flattened.is_char_boundary(end) {
        end -= 1;
    }
    flattened[..end].to_string()
}

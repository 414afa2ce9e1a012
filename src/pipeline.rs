//! Avatar orchestrator: sequences normalization, persona generation and
//! headshot rendering, and assembles the outcome.

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use crate::avatar::AvatarRenderer;
use crate::error::Result;
use crate::extract;
use crate::models::{AvatarOutcome, CaseInput, ModelsUsed};
use crate::persona::PersonaGenerator;

pub struct AvatarPipeline {
    persona: Arc<dyn PersonaGenerator>,
    renderer: Arc<dyn AvatarRenderer>,
    models: ModelsUsed,
    sequence: AtomicU64,
}

impl AvatarPipeline {
    pub fn new(
        persona: Arc<dyn PersonaGenerator>,
        renderer: Arc<dyn AvatarRenderer>,
        models: ModelsUsed,
    ) -> Self {
        Self {
            persona,
            renderer,
            models,
            sequence: AtomicU64::new(1),
        }
    }

    pub fn models(&self) -> &ModelsUsed {
        &self.models
    }

    /// Run the full pipeline for one request. Stages run strictly in order;
    /// any failure short-circuits, so the image provider is never called
    /// when persona generation fails.
    pub async fn create(&self, input: CaseInput) -> Result<AvatarOutcome> {
        let request = self.sequence.fetch_add(1, Ordering::Relaxed);

        tracing::info!(
            request,
            documents = input.documents.len(),
            has_query = input.text_query.is_some(),
            "Normalizing case input"
        );
        let normalized = extract::normalize(&input)?;

        tracing::info!(request, model = %self.models.chat, "Generating persona");
        let persona = self.persona.generate(&normalized).await.inspect_err(|e| {
            tracing::error!(request, error = %e, "Persona generation failed");
        })?;

        tracing::info!(request, model = %self.models.image, "Generating avatar image");
        let avatar = self.renderer.render(&persona).await.inspect_err(|e| {
            tracing::error!(request, error = %e, "Avatar rendering failed");
        })?;

        let avatar_id = mint_avatar_id();
        tracing::info!(request, %avatar_id, "Avatar assembled");

        let query = input
            .text_query
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty());

        Ok(AvatarOutcome {
            avatar_id,
            persona: persona.persona_text,
            image_url: avatar.image_url,
            query,
            files_processed: normalized.source_filenames,
            files_failed: normalized.failed_documents,
            input_truncated: persona.truncated,
            models_used: self.models.clone(),
            created_at: Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        })
    }
}

/// Opaque identifier, unique within a process lifetime (and beyond).
fn mint_avatar_id() -> String {
    format!("expert_{}", Uuid::new_v4().simple())
}

use std::sync::Arc;

use super::gate::{self, Page};
use super::{store::StoreHandle, PageError, Session};
use crate::models::generation::{AspectRatio, GeneratedImage, GenerationConfig};
use crate::repositories::{imagen::ImageGenerator, state::Action};

/// Image generator view. The gallery lives only as long as this page.
pub struct ImageGeneratorPage {
    store: StoreHandle,
    generator: Arc<dyn ImageGenerator>,
    draft: GenerationConfig,
    gallery: Vec<GeneratedImage>,
}

impl ImageGeneratorPage {
    pub fn new(session: &Session) -> Self {
        Self {
            store: session.store.clone(),
            generator: session.generator.clone(),
            draft: GenerationConfig::default(),
            gallery: Vec::new(),
        }
    }

    pub fn draft(&self) -> &GenerationConfig {
        &self.draft
    }

    pub fn set_prompt(&mut self, prompt: &str) {
        self.draft.prompt = prompt.to_string();
    }

    pub fn set_negative_prompt(&mut self, negative_prompt: &str) {
        self.draft.negative_prompt = negative_prompt.to_string();
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: AspectRatio) {
        self.draft.aspect_ratio = aspect_ratio;
    }

    pub fn apply_style(&mut self, style: &str) {
        self.draft.prompt = format!("{}, {}", style, self.draft.prompt);
    }

    /// Newest first.
    pub fn gallery(&self) -> &[GeneratedImage] {
        &self.gallery
    }

    pub fn delete_image(&mut self, id: &str) -> bool {
        let before = self.gallery.len();
        self.gallery.retain(|image| image.id != id);
        self.gallery.len() != before
    }

    /// Spends one credit up front and gives it back if the generation
    /// service fails. Holding `&mut self` for the whole call keeps a second
    /// request from starting while one is in flight.
    pub async fn generate(&mut self) -> Result<GeneratedImage, PageError> {
        if self.draft.prompt.trim().is_empty() {
            return Err(PageError::EmptyPrompt);
        }

        let state = self.store.snapshot().await?;
        gate::require(&state, Page::ImageGenerator)?;
        let user = state
            .current_user
            .as_ref()
            .ok_or(PageError::InsufficientCredits)?;
        if user.is_blocked() {
            return Err(PageError::GenerationBlocked);
        }
        if user.credits < 1 {
            return Err(PageError::InsufficientCredits);
        }

        self.store
            .dispatch(Action::UpdateUserCredits {
                user_id: user.id.clone(),
                delta: -1,
            })
            .await?;

        match self.generator.generate(&self.draft).await {
            Ok(src) => {
                let image = GeneratedImage::new(src, &self.draft.prompt);
                self.gallery.insert(0, image.clone());
                log::info!("Generated image {} for {}.", image.id, user.id);
                Ok(image)
            }
            Err(e) => {
                log::error!("Image generation failed for {}: {}", user.id, e);
                self.store
                    .dispatch(Action::UpdateUserCredits {
                        user_id: user.id.clone(),
                        delta: 1,
                    })
                    .await?;
                Err(PageError::Generation(e.to_string()))
            }
        }
    }
}

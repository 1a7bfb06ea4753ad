use serde::Serialize;
use tracing::debug;

use crate::draft::{DraftError, DraftValidator, PostDraft};
use crate::images::{
    ImageCandidatePool, ImagePoolConfig, ImagePoolError, ImageSource, PositionImages,
};

/// Errors from composer operations. A failed operation leaves state as it
/// was.
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error(transparent)]
    Validation(#[from] DraftError),

    #[error("No draft at position {0}")]
    UnknownPosition(usize),

    #[error("Image is not a candidate at position {position}: {url}")]
    UnknownImage { position: usize, url: String },

    #[error("A thread must keep at least one draft")]
    LastDraft,

    #[error(transparent)]
    Images(#[from] ImagePoolError),
}

/// Serializable view of the composer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadSnapshot {
    pub drafts: Vec<PostDraft>,
    pub images: Vec<PositionImages>,
}

/// Ordered drafts plus their image pools. Positions are 1-based and the
/// draft list is never empty.
#[derive(Debug, Clone)]
pub struct ThreadComposer {
    drafts: Vec<PostDraft>,
    images: ImageCandidatePool,
}

impl ThreadComposer {
    /// A composer holding one empty draft.
    pub fn new(config: ImagePoolConfig) -> Self {
        let mut images = ImageCandidatePool::new(config);
        images.reset(1, &[], None);
        Self {
            drafts: vec![PostDraft::default()],
            images,
        }
    }

    /// Replace the whole draft set, re-initializing every pool with
    /// `initial_images` and every counter with zero.
    pub fn load(
        &mut self,
        drafts: Vec<PostDraft>,
        initial_images: &[String],
        default_query: Option<String>,
    ) -> Result<(), ComposeError> {
        if drafts.is_empty() {
            return Err(DraftError::NoPosts.into());
        }
        for draft in &drafts {
            DraftValidator::check_budget(&draft.text)?;
        }
        self.images.reset(drafts.len(), initial_images, default_query);
        self.drafts = drafts;
        debug!(drafts = self.drafts.len(), "Composer loaded");
        Ok(())
    }

    pub fn drafts(&self) -> &[PostDraft] {
        &self.drafts
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    pub fn images(&self) -> &ImageCandidatePool {
        &self.images
    }

    pub fn snapshot(&self) -> ThreadSnapshot {
        ThreadSnapshot {
            drafts: self.drafts.clone(),
            images: self.images.positions(),
        }
    }

    /// Replace the text at `position`. Text over the budget is rejected and
    /// the previous text kept.
    pub fn set_text(&mut self, position: usize, text: impl Into<String>) -> Result<(), ComposeError> {
        let text = text.into();
        let index = self.index(position)?;
        DraftValidator::check_budget(&text)?;
        self.drafts[index].text = text;
        Ok(())
    }

    /// Select `url` at `position`, or deselect it if it is already selected.
    /// Returns the selection after the toggle.
    ///
    /// Deselecting always works, even once a refresh has dropped the URL
    /// from the pool. A new selection must be a candidate at `position`.
    pub fn select_image(&mut self, position: usize, url: &str) -> Result<Option<&str>, ComposeError> {
        let index = self.index(position)?;
        if self.drafts[index].image_url.as_deref() == Some(url) {
            self.drafts[index].image_url = None;
            return Ok(None);
        }
        if !self.images.contains(position, url) {
            return Err(ComposeError::UnknownImage {
                position,
                url: url.to_string(),
            });
        }

        let draft = &mut self.drafts[index];
        draft.image_url = Some(url.to_string());
        Ok(draft.image_url.as_deref())
    }

    /// Append an empty draft. Returns its position.
    pub fn insert(&mut self) -> usize {
        self.drafts.push(PostDraft::default());
        let position = self.images.push_position();
        debug_assert_eq!(position, self.drafts.len());
        position
    }

    /// Remove the draft at `position`; later pools move down with their
    /// drafts.
    pub fn remove(&mut self, position: usize) -> Result<PostDraft, ComposeError> {
        let index = self.index(position)?;
        if self.drafts.len() == 1 {
            return Err(ComposeError::LastDraft);
        }
        self.images.remove_position(position)?;
        Ok(self.drafts.remove(index))
    }

    /// Offer `url` (e.g. an uploaded asset) as a candidate at `position`.
    pub fn add_candidate(&mut self, position: usize, url: impl Into<String>) -> Result<(), ComposeError> {
        self.index(position)?;
        self.images.add_candidate(position, url)?;
        Ok(())
    }

    /// Refresh one position, or every position when `position` is `None`.
    pub async fn refresh_images(
        &mut self,
        source: &dyn ImageSource,
        position: Option<usize>,
        custom_query: Option<&str>,
    ) -> Result<Vec<String>, ComposeError> {
        let images = match position {
            Some(position) => {
                self.index(position)?;
                self.images.refresh(source, position, custom_query).await?
            }
            None => self.images.refresh_all(source, custom_query).await?,
        };
        Ok(images)
    }

    fn index(&self, position: usize) -> Result<usize, ComposeError> {
        if position == 0 || position > self.drafts.len() {
            Err(ComposeError::UnknownPosition(position))
        } else {
            Ok(position - 1)
        }
    }
}

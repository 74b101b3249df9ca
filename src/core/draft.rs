//! Unsaved authoring state

use thiserror::Error;

use crate::store::SaveRequest;

/// Errors raised while turning a draft into a save request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("NPC Id must be an integer, got {input:?}")]
    InvalidId { input: String },
}

/// The book being composed, exactly as typed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftState {
    /// Markup from the editor
    pub markup_content: String,
    /// Raw text of the NPC Id field
    pub id_input: String,
    /// Raw text of the Command field
    pub command_input: String,
}

impl DraftState {
    /// Parse the NPC Id field.
    ///
    /// Surrounding whitespace is ignored. Anything else that is not a whole
    /// `i64` (empty input, fractions, trailing text) is rejected.
    pub fn parse_id(&self) -> Result<i64, DraftError> {
        self.id_input
            .trim()
            .parse::<i64>()
            .map_err(|_| DraftError::InvalidId {
                input: self.id_input.clone(),
            })
    }

    /// Build the request body for a save
    pub fn to_save_request(&self) -> Result<SaveRequest, DraftError> {
        Ok(SaveRequest {
            html_content: self.markup_content.clone(),
            n: self.parse_id()?,
            command: self.command_input.clone(),
        })
    }
}

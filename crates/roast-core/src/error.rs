use roast_providers::CompletionError;

/// The vision call failed or produced nothing usable
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("feature extraction failed: could not decode image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("feature extraction failed: could not encode image: {0}")]
    Encode(#[source] image::ImageError),
    #[error("feature extraction failed: {0}")]
    Provider(#[from] CompletionError),
    #[error("feature extraction failed: vision model returned no text")]
    Empty,
}

/// The chat call failed or produced nothing usable
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("response generation failed: {0}")]
    Completion(#[from] CompletionError),
}

impl GenerationError {
    /// The endpoint answered 2xx but the body lacked the expected fields.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            GenerationError::Completion(CompletionError::Malformed(_) | CompletionError::NoChoices)
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

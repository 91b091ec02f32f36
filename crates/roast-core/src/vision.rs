//! Vision feature extraction
//!
//! Turns an uploaded photo into a free-text list of the person's physical
//! features by calling whichever vision backend is configured. The text is
//! opaque here; it is only ever embedded into the persona prompt.

use image::DynamicImage;
use roast_providers::{
    CompletionClient, CompletionError, FireworksVision, GroqVision, VisionProvider,
};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::{VisionBackend, VisionConfig};
use crate::error::ExtractionError;
use crate::imaging;
use crate::prompts::FEATURE_EXTRACTION_INSTRUCTION;

/// Vision model output for one uploaded photo
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FeatureDescription(String);

impl FeatureDescription {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for FeatureDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone)]
pub struct FeatureExtractor {
    provider: Arc<dyn VisionProvider>,
}

impl FeatureExtractor {
    pub fn new(provider: Arc<dyn VisionProvider>) -> Self {
        Self { provider }
    }

    pub fn from_config(config: &VisionConfig) -> Result<Self, CompletionError> {
        let client =
            CompletionClient::with_options(&config.api_url, &config.api_key, config.options)?;
        let provider: Arc<dyn VisionProvider> = match config.backend {
            VisionBackend::Groq => Arc::new(GroqVision::new(client, &config.model)),
            VisionBackend::Fireworks => Arc::new(FireworksVision::new(client, &config.model)),
        };
        Ok(Self::new(provider))
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Decode raw upload bytes, then extract.
    pub async fn extract_from_bytes(
        &self,
        bytes: &[u8],
    ) -> Result<FeatureDescription, ExtractionError> {
        let image = imaging::decode(bytes).map_err(ExtractionError::Decode)?;
        self.extract_features(&image).await
    }

    /// One vision call, no retries beyond what the transport is configured for.
    pub async fn extract_features(
        &self,
        image: &DynamicImage,
    ) -> Result<FeatureDescription, ExtractionError> {
        info!(
            "Extracting features from {}x{} {:?} image via {}",
            image.width(),
            image.height(),
            image.color(),
            self.provider.name()
        );

        let data_url = imaging::to_jpeg_data_url(image).map_err(ExtractionError::Encode)?;

        let text = match self
            .provider
            .describe(&data_url, FEATURE_EXTRACTION_INSTRUCTION)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!("Feature extraction failed: {}", e);
                return Err(e.into());
            }
        };

        if text.trim().is_empty() {
            warn!("Vision model returned an empty feature list");
            return Err(ExtractionError::Empty);
        }

        info!("Features extracted ({} chars)", text.len());
        debug!("Features: {}", text.chars().take(200).collect::<String>());

        Ok(FeatureDescription(text))
    }
}

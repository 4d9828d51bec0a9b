// ============================================================
// Layer 2: Classify Use Case
// ============================================================
// Turns one uploaded photo into a refund decision:
//
//   Step 1: File present and named?  → otherwise a prompt
//   Step 2: Persist under a unique name (Layer 6)
//   Step 3: Classifier loaded?       → otherwise "not available"
//   Step 4: Decode + resize + scale  (Layer 4)
//   Step 5: Spoilage probability     (Layer 5)
//   Step 6: Threshold → label → customer message (Layer 3)
//
// The saved file lives exactly as long as the `StoredUpload`
// guard, so it is removed on every path out of `classify`.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::data::image::{decode_image, prepare_image};
use crate::domain::verdict::FoodLabel;
use crate::infra::model_loader::ModelRegistry;
use crate::infra::uploads::UploadStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyConfig {
    /// Side length the image is resized to before inference.
    pub image_size:         u32,
    pub spoilage_threshold: f32,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self { image_size: 224, spoilage_threshold: 0.5 }
    }
}

/// The multipart `file` field as received.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes:    Vec<u8>,
}

/// Every non-error result of a classify request. All of them are
/// reported to the client with HTTP 200.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifyOutcome {
    NoFile,
    NoFilename,
    ModelUnavailable,
    UnreadableImage,
    Verdict { label: FoodLabel, probability: f32 },
}

impl ClassifyOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            ClassifyOutcome::NoFile => "No file uploaded.",
            ClassifyOutcome::NoFilename => "No file selected.",
            ClassifyOutcome::ModelUnavailable => "CNN model not available for classification.",
            ClassifyOutcome::UnreadableImage => "Error: Unable to load image.",
            ClassifyOutcome::Verdict { label, .. } => label.refund_message(),
        }
    }
}

pub struct ClassifyUseCase {
    registry: Arc<ModelRegistry>,
    uploads:  UploadStore,
    config:   ClassifyConfig,
}

impl ClassifyUseCase {
    pub fn new(registry: Arc<ModelRegistry>, uploads: UploadStore, config: ClassifyConfig) -> Self {
        Self { registry, uploads, config }
    }

    pub fn classify(&self, file: Option<UploadedFile>) -> Result<ClassifyOutcome> {
        let Some(file) = file else {
            return Ok(ClassifyOutcome::NoFile);
        };
        if file.filename.is_empty() {
            return Ok(ClassifyOutcome::NoFilename);
        }

        let stored = self.uploads.persist(&file.filename, &file.bytes)?;

        let Some(classifier) = self.registry.classifier.as_deref() else {
            tracing::warn!("Classify request for '{}' but no classifier is loaded", file.filename);
            return Ok(ClassifyOutcome::ModelUnavailable);
        };

        let img = match decode_image(stored.path()) {
            Ok(img) => img,
            Err(e) => {
                tracing::info!("Rejected upload '{}': {e:#}", file.filename);
                return Ok(ClassifyOutcome::UnreadableImage);
            }
        };
        let prepared = prepare_image(&img, self.config.image_size);

        let probability = classifier.spoilage_probability(&prepared)?;
        let label = FoodLabel::from_probability(probability, self.config.spoilage_threshold);
        tracing::info!(
            "Classified '{}' as {} (p = {:.4})",
            file.filename,
            label.as_str(),
            probability
        );

        Ok(ClassifyOutcome::Verdict { label, probability })
    }
}

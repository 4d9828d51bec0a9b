// ============================================================
// Layer 3: Spoilage Verdict
// ============================================================
// The classifier emits one probability. Thresholding picks one
// of two labels, and each label maps to the sentence shown to
// the customer instead of the raw class name.

use serde::{Deserialize, Serialize};

/// The two classes the food classifier was trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodLabel {
    GoodItems,
    SpoiledItems,
}

impl FoodLabel {
    /// Probabilities at or above `threshold` count as spoiled.
    pub fn from_probability(probability: f32, threshold: f32) -> Self {
        if probability >= threshold {
            FoodLabel::SpoiledItems
        } else {
            FoodLabel::GoodItems
        }
    }

    /// Class name as used in the training data.
    pub fn as_str(&self) -> &'static str {
        match self {
            FoodLabel::GoodItems => "good_items",
            FoodLabel::SpoiledItems => "spoiled_items",
        }
    }

    /// Customer-facing refund decision for this label.
    pub fn refund_message(&self) -> &'static str {
        match self {
            FoodLabel::SpoiledItems => {
                "I can see your food is spoiled. You can claim a refund. I apologize for the inconvenience."
            }
            FoodLabel::GoodItems => {
                "Your food appears to be in good condition. Refund cannot be processed based on the image."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_inclusive() {
        assert_eq!(FoodLabel::from_probability(0.5, 0.5), FoodLabel::SpoiledItems);
        assert_eq!(FoodLabel::from_probability(0.4999, 0.5), FoodLabel::GoodItems);
    }

    #[test]
    fn test_messages_differ_by_label() {
        assert!(FoodLabel::SpoiledItems.refund_message().contains("claim a refund"));
        assert!(FoodLabel::GoodItems.refund_message().contains("cannot be processed"));
    }

    #[test]
    fn test_serialises_as_training_class_name() {
        let json = serde_json::to_string(&FoodLabel::SpoiledItems).unwrap();
        assert_eq!(json, format!("\"{}\"", FoodLabel::SpoiledItems.as_str()));
    }
}

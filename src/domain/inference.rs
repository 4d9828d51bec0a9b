// ============================================================
// Layer 3: Inference Values
// ============================================================
// Plain-vector forms of what flows in and out of the runtime.
// The ML layer converts these to and from tensors.

/// An image resized and scaled for the classifier.
///
/// `pixels` is channels-first (C, H, W), every value in [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedImage {
    pub pixels:   Vec<f32>,
    pub channels: usize,
    pub height:   usize,
    pub width:    usize,
}

impl PreparedImage {
    pub fn shape(&self) -> [usize; 3] {
        [self.channels, self.height, self.width]
    }
}

/// Recurrent state carried between two decoder steps.
#[derive(Debug, Clone, PartialEq)]
pub struct DecoderState {
    pub hidden: Vec<f32>,
    pub cell:   Vec<f32>,
}

/// What one decoder step produces.
#[derive(Debug, Clone)]
pub struct StepOutput {
    /// Next-token distribution over the target vocabulary.
    pub probabilities: Vec<f32>,
    pub state:         DecoderState,
}

impl StepOutput {
    /// Index of the most probable token. Ties resolve to the lowest id.
    pub fn argmax(&self) -> Option<u32> {
        let mut best: Option<(usize, f32)> = None;
        for (i, &p) in self.probabilities.iter().enumerate() {
            match best {
                Some((_, bp)) if p <= bp => {}
                _ => best = Some((i, p)),
            }
        }
        best.map(|(i, _)| i as u32)
    }
}

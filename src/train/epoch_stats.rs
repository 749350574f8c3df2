use serde::{Deserialize, Serialize};

/// Per-epoch training statistics emitted by `train_loop`.
///
/// When a `progress_tx` channel is configured in `TrainConfig`, the loop sends
/// one `EpochStats` value at the end of every completed epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    pub total_epochs: usize,
    /// Samples actually trained on this epoch (fewer than the dataset when stopped).
    pub samples: usize,
    /// Mean squared error of the predictions made just before each update.
    pub mean_loss: f32,
    /// Fraction in [0, 1] of samples whose pre-update prediction had the right argmax.
    pub accuracy: f32,
    pub elapsed_ms: u64,
}

/// Result of `evaluate` over a held-out set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub samples: usize,
    pub correct: usize,
    pub accuracy: f32,
    pub mean_loss: f32,
}

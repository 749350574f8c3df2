use std::sync::mpsc;
use std::sync::{atomic::AtomicBool, Arc};

use crate::train::epoch_stats::EpochStats;

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `epochs`       — total number of full passes over the samples
/// - `shuffle`      — visit samples in a fresh random order every epoch
/// - `log_every`    — log a progress line every this many samples (0 = never)
/// - `progress_tx`  — optional channel sender; one `EpochStats` is sent per
///                    completed epoch.  If the receiver is dropped the loop
///                    terminates early.
/// - `stop_flag`    — optional atomic flag; when set from another thread the
///                    loop stops after the current sample.
pub struct TrainConfig {
    pub epochs: usize,
    pub shuffle: bool,
    pub log_every: usize,
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
    pub stop_flag: Option<Arc<AtomicBool>>,
}

impl TrainConfig {
    /// Creates a minimal `TrainConfig` with shuffling on, no progress channel
    /// and no stop flag.
    pub fn new(epochs: usize) -> Self {
        TrainConfig {
            epochs,
            shuffle: true,
            log_every: 10_000,
            progress_tx: None,
            stop_flag: None,
        }
    }
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig::new(1)
    }
}

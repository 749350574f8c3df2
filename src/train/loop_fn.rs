use std::sync::atomic::Ordering;
use std::time::Instant;

use log::{debug, info, warn};
use rand::seq::SliceRandom;

use crate::dataset::sample::Sample;
use crate::error::Result;
use crate::loss::mse::MseLoss;
use crate::network::network::NeuralNetwork;
use crate::train::epoch_stats::{EpochStats, Evaluation};
use crate::train::train_config::TrainConfig;

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Trains `network` on `samples` for `config.epochs` epochs, one SGD step per
/// sample, and returns the stats of every epoch that ran.
///
/// # Early termination
/// The loop stops if:
/// - `config.stop_flag` is set (checked before every sample), **or**
/// - the `progress_tx` receiver has been dropped.
///
/// An interrupted epoch still produces an `EpochStats` entry covering the
/// samples it got through.
pub fn train_loop(
    network: &mut NeuralNetwork,
    samples: &[Sample],
    config: &TrainConfig,
) -> Result<Vec<EpochStats>> {
    let mut history = Vec::with_capacity(config.epochs);
    if samples.is_empty() {
        warn!("train_loop called with no samples; nothing to do");
        return Ok(history);
    }

    let mut order: Vec<usize> = (0..samples.len()).collect();
    let mut rng = rand::thread_rng();

    for epoch in 1..=config.epochs {
        if stop_requested(config) {
            break;
        }

        let t_start = Instant::now();
        if config.shuffle {
            order.shuffle(&mut rng);
        }

        let mut total_loss = 0.0;
        let mut correct = 0usize;
        let mut seen = 0usize;

        for &idx in &order {
            if stop_requested(config) {
                break;
            }

            let sample = &samples[idx];
            let target = sample.target();
            let output = network.backpropagate(&sample.input(), &target)?;

            total_loss += MseLoss::loss(&output, &target);
            if argmax(&output) == sample.label as usize {
                correct += 1;
            }
            seen += 1;

            if config.log_every > 0 && seen % config.log_every == 0 {
                debug!(
                    "epoch {}: {}/{} samples, running loss {:.6}",
                    epoch,
                    seen,
                    samples.len(),
                    total_loss / seen as f32
                );
            }
        }

        let denom = seen.max(1) as f32;
        let stats = EpochStats {
            epoch,
            total_epochs: config.epochs,
            samples: seen,
            mean_loss: total_loss / denom,
            accuracy: correct as f32 / denom,
            elapsed_ms: t_start.elapsed().as_millis() as u64,
        };

        info!(
            "epoch {}/{}: loss {:.6}, train accuracy {:.2}% ({} samples, {} ms)",
            stats.epoch,
            stats.total_epochs,
            stats.mean_loss,
            stats.accuracy * 100.0,
            stats.samples,
            stats.elapsed_ms
        );

        // If the receiver has been dropped, stop training.
        let disconnected = match config.progress_tx {
            Some(ref tx) => tx.send(stats.clone()).is_err(),
            None => false,
        };

        history.push(stats);

        if disconnected || seen < samples.len() {
            break;
        }
    }

    Ok(history)
}

/// Accuracy (argmax match) and mean squared error over `samples` without
/// touching the weights.
pub fn evaluate(network: &NeuralNetwork, samples: &[Sample]) -> Result<Evaluation> {
    let mut correct = 0usize;
    let mut total_loss = 0.0;

    for sample in samples {
        let output = network.predict(&sample.input())?;
        total_loss += MseLoss::loss(&output, &sample.target());
        if argmax(&output) == sample.label as usize {
            correct += 1;
        }
    }

    let denom = samples.len().max(1) as f32;
    Ok(Evaluation {
        samples: samples.len(),
        correct,
        accuracy: correct as f32 / denom,
        mean_loss: total_loss / denom,
    })
}

/// Index of the maximum element in a slice; 0 for an empty slice.
pub fn argmax(v: &[f32]) -> usize {
    v.iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn stop_requested(config: &TrainConfig) -> bool {
    config
        .stop_flag
        .as_ref()
        .map(|flag| flag.load(Ordering::Relaxed))
        .unwrap_or(false)
}

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tiny_http::Server;

use nn_digits::dataset::{load_idx_pair, Sample, CLASSES, IMAGE_PIXELS};
use nn_digits::{argmax, evaluate, train_loop, NeuralNetwork, TrainConfig};

use crate::preprocess::image_file_to_input;
use crate::routes;
use crate::state::AppState;

#[derive(Args)]
pub struct TrainArgs {
    /// IDX3 image file
    #[arg(long)]
    images: PathBuf,

    /// IDX1 label file
    #[arg(long)]
    labels: PathBuf,

    /// Where the trained network is written
    #[arg(short, long, default_value = "model.json")]
    model: PathBuf,

    /// Continue training the network already stored at --model
    #[arg(long)]
    resume: bool,

    /// Hidden layer size for a fresh network
    #[arg(long, default_value = "64")]
    hidden: usize,

    /// Passes over the training set
    #[arg(short, long, default_value = "1")]
    epochs: usize,

    /// Learning rate (defaults to the stored one when resuming, else 0.1)
    #[arg(long)]
    learning_rate: Option<f32>,

    /// Seed for the initial weights of a fresh network
    #[arg(long)]
    seed: Option<u64>,

    /// Visit samples in file order instead of shuffling every epoch
    #[arg(long)]
    no_shuffle: bool,

    /// Held-out IDX3 image file evaluated after training
    #[arg(long, requires = "test_labels")]
    test_images: Option<PathBuf>,

    /// Held-out IDX1 label file evaluated after training
    #[arg(long, requires = "test_images")]
    test_labels: Option<PathBuf>,
}

#[derive(Args)]
pub struct TestArgs {
    /// Saved network
    #[arg(short, long, default_value = "model.json")]
    model: PathBuf,

    /// IDX3 image file
    #[arg(long)]
    images: PathBuf,

    /// IDX1 label file
    #[arg(long)]
    labels: PathBuf,
}

#[derive(Args)]
pub struct PredictArgs {
    /// Image to classify (PNG, JPEG, BMP or GIF)
    image: PathBuf,

    /// Saved network
    #[arg(short, long, default_value = "model.json")]
    model: PathBuf,

    /// Treat the image as dark ink on a light background
    #[arg(long)]
    invert: bool,
}

#[derive(Args)]
pub struct ServeArgs {
    /// Network to serve; created with random weights if the file does not exist
    #[arg(short, long, default_value = "model.json")]
    model: PathBuf,

    /// Listen address
    #[arg(long, default_value = "127.0.0.1:7878")]
    addr: String,

    /// Hidden layer size used when a fresh network has to be created
    #[arg(long, default_value = "64")]
    hidden: usize,
}

pub fn train(args: TrainArgs) -> Result<()> {
    let samples = load_samples(&args.images, &args.labels)?;

    let mut network = if args.resume {
        load_network(&args.model)?
    } else {
        match args.seed {
            Some(seed) => {
                info!("using seed {}", seed);
                NeuralNetwork::with_rng(IMAGE_PIXELS, args.hidden, CLASSES, &mut StdRng::seed_from_u64(seed))
            }
            None => NeuralNetwork::new(IMAGE_PIXELS, args.hidden, CLASSES),
        }
    };
    if let Some(lr) = args.learning_rate {
        network.set_learning_rate(lr);
    }

    info!(
        "training {}-{}-{} network on {} samples for {} epoch(s), learning rate {}",
        network.input_nodes(),
        network.hidden_nodes(),
        network.output_nodes(),
        samples.len(),
        args.epochs,
        network.learning_rate()
    );

    let mut config = TrainConfig::new(args.epochs);
    config.shuffle = !args.no_shuffle;
    let history = train_loop(&mut network, &samples, &config)?;

    if let Some(last) = history.last() {
        println!(
            "Final epoch: loss {:.6}, train accuracy {:.2}%",
            last.mean_loss,
            last.accuracy * 100.0
        );
    }

    network
        .save_json(&args.model)
        .with_context(|| format!("failed to save network to {}", args.model.display()))?;
    println!("Model saved to {}", args.model.display());

    if let (Some(images), Some(labels)) = (&args.test_images, &args.test_labels) {
        let test_samples = load_samples(images, labels)?;
        report(&network, &test_samples)?;
    }

    Ok(())
}

pub fn test(args: TestArgs) -> Result<()> {
    let network = load_network(&args.model)?;
    let samples = load_samples(&args.images, &args.labels)?;
    report(&network, &samples)
}

pub fn predict(args: PredictArgs) -> Result<()> {
    let network = load_network(&args.model)?;
    let input = image_file_to_input(&args.image, args.invert)
        .with_context(|| format!("failed to read image {}", args.image.display()))?;
    let outputs = network.predict(&input)?;

    println!("Predicted digit: {}", argmax(&outputs));
    for (digit, value) in outputs.iter().enumerate() {
        println!("  {}: {:.4}", digit, value);
    }
    Ok(())
}

pub fn serve(args: ServeArgs) -> Result<()> {
    let network = if args.model.exists() {
        load_network(&args.model)?
    } else {
        warn!(
            "{} not found; starting from a random {}-{}-{} network",
            args.model.display(),
            IMAGE_PIXELS,
            args.hidden,
            CLASSES
        );
        NeuralNetwork::new(IMAGE_PIXELS, args.hidden, CLASSES)
    };

    let server = Server::http(&args.addr).map_err(|e| anyhow!("failed to bind {}: {}", args.addr, e))?;
    let shared_state = Arc::new(Mutex::new(AppState::new(network, args.model)));

    info!("listening on http://{}", args.addr);

    // One thread per request; the network itself is guarded by the state mutex.
    for request in server.incoming_requests() {
        let state_clone = shared_state.clone();
        std::thread::spawn(move || {
            routes::dispatch(request, state_clone);
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_samples(images: &Path, labels: &Path) -> Result<Vec<Sample>> {
    load_idx_pair(images, labels)
        .with_context(|| format!("failed to load {} / {}", images.display(), labels.display()))
}

fn load_network(path: &Path) -> Result<NeuralNetwork> {
    let network = NeuralNetwork::load_json(path)
        .with_context(|| format!("failed to load network from {}", path.display()))?;
    if network.input_nodes() != IMAGE_PIXELS || network.output_nodes() != CLASSES {
        bail!(
            "{} is a {}-{}-{} network; digits need {} inputs and {} outputs",
            path.display(),
            network.input_nodes(),
            network.hidden_nodes(),
            network.output_nodes(),
            IMAGE_PIXELS,
            CLASSES
        );
    }
    Ok(network)
}

fn report(network: &NeuralNetwork, samples: &[Sample]) -> Result<()> {
    let eval = evaluate(network, samples)?;
    println!(
        "Test accuracy: {:.2}% ({}/{}), mean squared error {:.6}",
        eval.accuracy * 100.0,
        eval.correct,
        eval.samples,
        eval.mean_loss
    );
    Ok(())
}

//! nn-digits command-line front end.
//!
//! Trains, tests and serves a 784 → hidden → 10 sigmoid network on MNIST.
//!
//! ```text
//! nn-digits train --images train-images-idx3-ubyte --labels train-labels-idx1-ubyte
//! nn-digits test  --images t10k-images-idx3-ubyte  --labels t10k-labels-idx1-ubyte
//! nn-digits predict digit.png --invert
//! nn-digits serve            # then open http://127.0.0.1:7878
//! ```

mod commands;
mod preprocess;
mod routes;
mod state;

use clap::{Parser, Subcommand};

use commands::{PredictArgs, ServeArgs, TestArgs, TrainArgs};

#[derive(Parser)]
#[command(name = "nn-digits")]
#[command(version)]
#[command(about = "Handwritten digit recognition with a from-scratch sigmoid network")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a network on an MNIST IDX pair and save it as JSON
    Train(TrainArgs),

    /// Report accuracy of a saved network on an MNIST IDX pair
    Test(TestArgs),

    /// Classify a single image file
    Predict(PredictArgs),

    /// Serve a drawing page for interactive prediction and training
    Serve(ServeArgs),
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => commands::train(args),
        Commands::Test(args) => commands::test(args),
        Commands::Predict(args) => commands::predict(args),
        Commands::Serve(args) => commands::serve(args),
    }
}

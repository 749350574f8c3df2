use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use nn_digits::NeuralNetwork;

/// Everything the drawing server shares between request threads.
pub struct AppState {
    /// The live network; `/train` mutates it in place.
    pub network: NeuralNetwork,
    /// Where `/save` writes the network.
    pub model_path: PathBuf,
    /// Drawings trained on since the server started.
    pub trained_samples: usize,
}

impl AppState {
    pub fn new(network: NeuralNetwork, model_path: PathBuf) -> Self {
        AppState {
            network,
            model_path,
            trained_samples: 0,
        }
    }
}

/// Shared state type — an `Arc<Mutex<AppState>>` passed to every handler.
pub type SharedState = Arc<Mutex<AppState>>;

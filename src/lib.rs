pub mod error;
pub mod math;
pub mod activation;
pub mod network;
pub mod loss;
pub mod dataset;
pub mod train;

// Convenience re-exports
pub use error::{NnError, Result};
pub use math::matrix::Matrix;
pub use activation::activation::{dsigmoid, sigmoid, ActivationFunction};
pub use network::network::NeuralNetwork;
pub use loss::mse::MseLoss;
pub use dataset::{Sample, IMAGE_PIXELS};
pub use train::{argmax, evaluate, train_loop, train_network, EpochStats, Evaluation, TrainConfig};

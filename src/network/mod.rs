pub mod network;
pub mod serialize;

pub use network::{NeuralNetwork, DEFAULT_LEARNING_RATE};

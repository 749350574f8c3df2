pub mod trainer;
pub mod epoch_stats;
pub mod train_config;
pub mod loop_fn;

pub use trainer::train_network;
pub use epoch_stats::{EpochStats, Evaluation};
pub use train_config::TrainConfig;
pub use loop_fn::{argmax, evaluate, train_loop};

mod model;
pub mod layers;
mod activation;
mod loss;
mod optimizer;
mod hyperparameters;
pub mod data;
pub mod preprocessing;
pub mod metrics;

pub use activation::ActivationType;
pub use hyperparameters::TrainConfig;
pub use layers::Layer;
pub use loss::{poisson_deviance, Loss};
pub use model::{LayerConfig, Model};
pub use optimizer::Optimizer;

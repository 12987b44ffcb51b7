/// Training configuration shared by every model in the walkthrough
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Learning rate for training
    pub learning_rate: f32,

    /// Number of training epochs
    pub epochs: usize,

    /// Batch size for training
    pub batch_size: usize,

    /// Seed for shuffling batches between epochs
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            learning_rate: 0.01,
            epochs: 100,
            batch_size: 32,
            seed: 42,
        }
    }
}

use crate::layers::Layer;

/// Plain gradient descent with a fixed learning rate. Every model in the
/// walkthrough is trained with the same optimizer settings so that deviance
/// differences reflect architecture, not tuning.
#[derive(Debug, Clone)]
pub struct Optimizer {
    pub learning_rate: f32,
}

impl Optimizer {
    pub fn new(learning_rate: f32) -> Self {
        Self { learning_rate }
    }

    /// Applies one descent step to every layer's parameters from its
    /// accumulated gradients.
    pub fn step(&self, layers: &mut [Box<dyn Layer>]) {
        for layer in layers.iter_mut() {
            let lr = self.learning_rate;
            let params = layer.params_mut();
            params.weights = &params.weights - lr * &params.weight_grads;
            params.bias = &params.bias - lr * &params.bias_grads;
        }
    }
}

pub mod dense;
pub mod dropout;

use std::any::Any;
use std::fmt::Debug;

use ndarray::{Array1, Array2};

use crate::activation::ActivationType;

/// Parameters and caches shared by every layer kind
#[derive(Debug, Clone)]
pub struct LayerParams {
    pub neurons: usize,
    pub inputs: usize,
    pub weights: Array2<f32>,
    pub bias: Array1<f32>,
    pub activation: ActivationType,
    pub weight_grads: Array2<f32>,
    pub bias_grads: Array1<f32>,
    pub activation_cache: Array1<f32>,
    pub preactivation_cache: Array1<f32>,
}

pub trait Layer: Debug {
    fn forward(&mut self, input: &Array1<f32>) -> Array1<f32>;

    /// Backpropagates `grad_output` through this layer, accumulating
    /// parameter gradients, and returns the gradient for the layer below.
    /// `prev_layer_cache` is the activation cache of the layer below, or
    /// `None` for the first layer (its input is the model input).
    fn backward(
        &mut self,
        input: &Array1<f32>,
        grad_output: &Array1<f32>,
        prev_layer_cache: Option<&Array1<f32>>,
    ) -> Array1<f32>;

    fn clone_box(&self) -> Box<dyn Layer>;

    fn params(&self) -> &LayerParams;
    fn params_mut(&mut self) -> &mut LayerParams;

    fn add_to_weight_grads(&mut self, grads: Array2<f32>);
    fn add_to_bias_grads(&mut self, grads: Array1<f32>);

    /// Number of trainable parameters in this layer
    fn parameter_count(&self) -> usize {
        let params = self.params();
        params.weights.len() + params.bias.len()
    }

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl Clone for Box<dyn Layer> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

pub use dense::DenseLayer;
pub use dropout::DropoutLayer;

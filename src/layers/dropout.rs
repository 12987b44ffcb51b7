use std::any::Any;

use ndarray::{Array1, Array2};
use rand::Rng;

use crate::activation::ActivationType;
use crate::layers::{Layer, LayerParams};

/// Inverted dropout. Kept units are scaled by 1/(1-p) during training so
/// that evaluation mode is a plain pass-through.
#[derive(Debug, Clone)]
pub struct DropoutLayer {
    params: LayerParams,
    dropout_rate: f32,
    scale: f32,
    mask: Option<Array1<f32>>,
    is_training: bool,
}

impl DropoutLayer {
    pub fn new(size: usize, dropout_rate: f32) -> Self {
        assert!(
            (0.0..1.0).contains(&dropout_rate),
            "Dropout rate must be between 0 and 1"
        );

        let params = LayerParams {
            neurons: size,
            inputs: size,
            weights: Array2::zeros((1, 1)), // Dropout doesn't use weights
            bias: Array1::zeros(1),         // or bias
            activation: ActivationType::Linear,
            weight_grads: Array2::zeros((1, 1)),
            bias_grads: Array1::zeros(1),
            activation_cache: Array1::zeros(size),
            preactivation_cache: Array1::zeros(size),
        };

        DropoutLayer {
            params,
            dropout_rate,
            scale: 1.0 / (1.0 - dropout_rate),
            mask: None,
            is_training: true,
        }
    }

    pub fn set_training(&mut self, is_training: bool) {
        self.is_training = is_training;
    }
}

impl Layer for DropoutLayer {
    fn forward(&mut self, input: &Array1<f32>) -> Array1<f32> {
        if self.is_training {
            let mut rng = rand::rng();
            let mask: Array1<f32> = Array1::from_shape_fn(input.len(), |_| {
                if rng.random::<f32>() > self.dropout_rate {
                    self.scale
                } else {
                    0.0
                }
            });

            let output = input * &mask;
            self.params.activation_cache = output.clone();
            self.mask = Some(mask);
            output
        } else {
            self.params.activation_cache = input.clone();
            input.clone()
        }
    }

    fn backward(
        &mut self,
        _input: &Array1<f32>,
        grad_output: &Array1<f32>,
        _prev_layer_cache: Option<&Array1<f32>>,
    ) -> Array1<f32> {
        // Backprop multiplies by the same mask the forward pass drew
        if let Some(ref mask) = self.mask {
            grad_output * mask
        } else {
            grad_output.clone()
        }
    }

    fn clone_box(&self) -> Box<dyn Layer> {
        Box::new(self.clone())
    }

    fn params(&self) -> &LayerParams {
        &self.params
    }

    fn params_mut(&mut self) -> &mut LayerParams {
        &mut self.params
    }

    fn add_to_weight_grads(&mut self, _grads: Array2<f32>) {}
    fn add_to_bias_grads(&mut self, _grads: Array1<f32>) {}

    fn parameter_count(&self) -> usize {
        0
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;

    #[test]
    fn test_eval_mode_is_identity() {
        let mut layer = DropoutLayer::new(5, 0.5);
        layer.set_training(false);
        let input = Array1::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        let output = layer.forward(&input);
        assert_eq!(output, input);
    }

    #[test]
    fn test_training_mode_zeroes_or_scales() {
        let mut layer = DropoutLayer::new(100, 0.5);
        let input = Array1::ones(100);
        let output = layer.forward(&input);
        for &v in output.iter() {
            assert!(v == 0.0 || (v - 2.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_backward_reuses_mask() {
        let mut layer = DropoutLayer::new(50, 0.3);
        let input = Array1::ones(50);
        let output = layer.forward(&input);
        let grad = layer.backward(&input, &Array1::ones(50), None);
        // units dropped in forward carry no gradient
        for (&o, &g) in output.iter().zip(grad.iter()) {
            assert_eq!(o == 0.0, g == 0.0);
        }
    }

    #[test]
    #[should_panic(expected = "Dropout rate")]
    fn test_rejects_invalid_rate() {
        DropoutLayer::new(10, 1.0);
    }
}

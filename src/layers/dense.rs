use std::any::Any;

use ndarray::{Array1, Array2};
use rand_distr::{Distribution, Normal};

use crate::activation::ActivationType;
use crate::layers::{Layer, LayerParams};

/// Fully connected layer
#[derive(Debug, Clone)]
pub struct DenseLayer {
    pub params: LayerParams,
}

impl DenseLayer {
    pub fn new(inputs: usize, neurons: usize, activation: ActivationType) -> Self {
        // He initialization
        let std_dev = (2.0 / inputs as f32).sqrt();
        let normal_dist = Normal::new(0.0, std_dev).unwrap();

        // Weights are (neurons × inputs) so forward is weights.dot(input)
        let weights: Array2<f32> =
            Array2::from_shape_fn((neurons, inputs), |_| normal_dist.sample(&mut rand::rng()));
        let bias: Array1<f32> = Array1::zeros(neurons);
        let weight_grads: Array2<f32> = Array2::zeros((neurons, inputs));
        let bias_grads: Array1<f32> = Array1::zeros(neurons);
        let activation_cache: Array1<f32> = Array1::zeros(neurons);
        let preactivation_cache: Array1<f32> = Array1::zeros(neurons);

        let params = LayerParams {
            neurons,
            inputs,
            weights,
            bias,
            activation,
            weight_grads,
            bias_grads,
            activation_cache,
            preactivation_cache,
        };

        DenseLayer { params }
    }
}

impl Layer for DenseLayer {
    fn forward(&mut self, input: &Array1<f32>) -> Array1<f32> {
        assert_eq!(
            input.len(),
            self.params.inputs,
            "Input size does not match layer's input size"
        );

        // weights is (neurons × inputs), input is (inputs), result is (neurons)
        let output = self.params.weights.dot(input) + &self.params.bias;
        self.params.preactivation_cache = output.clone();
        let activated_output = output.mapv(|x| self.params.activation.apply(x));
        self.params.activation_cache = activated_output.clone();
        activated_output
    }

    fn backward(
        &mut self,
        input: &Array1<f32>,
        grad_output: &Array1<f32>,
        prev_layer_cache: Option<&Array1<f32>>,
    ) -> Array1<f32> {
        // Gradient with respect to the preactivation. For the Exp output
        // layer trained under Poisson deviance the incoming gradient is
        // already mu - y, which is the preactivation gradient of the
        // combined link + deviance, so it passes through unchanged.
        let dlayer = match self.params.activation {
            ActivationType::Exp => grad_output.clone(),
            _ => {
                let activation_derivative = self
                    .params
                    .preactivation_cache
                    .mapv(|x| self.params.activation.derivative(x));
                grad_output * &activation_derivative
            }
        };

        self.add_to_bias_grads(dlayer.clone());

        // dlayer is (neurons), the layer's input is (inputs); their outer
        // product is the (neurons × inputs) weight gradient
        let activation_input = prev_layer_cache.unwrap_or(input).clone();
        let dlayer_2d = dlayer.clone().insert_axis(ndarray::Axis(1));
        let input_2d = activation_input.insert_axis(ndarray::Axis(0));
        let weight_grads = dlayer_2d.dot(&input_2d);
        self.add_to_weight_grads(weight_grads);

        // Gradient for the layer below: weights^T · dlayer
        self.params.weights.t().dot(&dlayer)
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

    fn add_to_weight_grads(&mut self, grads: Array2<f32>) {
        self.params.weight_grads = &self.params.weight_grads + &grads;
    }

    fn add_to_bias_grads(&mut self, grads: Array1<f32>) {
        self.params.bias_grads = &self.params.bias_grads + &grads;
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

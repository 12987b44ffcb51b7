use ndarray::{array, Array1};

use crate::activation::ActivationType;
use crate::hyperparameters::TrainConfig;
use crate::layers::{DenseLayer, DropoutLayer, Layer};
use crate::loss::Loss;
use crate::optimizer::Optimizer;

/// Configuration for one dense layer, with an optional dropout layer
/// inserted after it
pub struct LayerConfig {
    pub inputs: usize,
    pub neurons: usize,
    pub activation: ActivationType,
    pub dropout: Option<f32>,
}

/// A sequential claim-frequency model. The GLM and every network in the
/// walkthrough share this graph; they differ only in layer configuration.
#[derive(Debug, Clone)]
pub struct Model {
    pub layers: Vec<Box<dyn Layer>>,
    pub loss: Loss,
}

impl Model {
    /// Create a model from layer configurations. The last configured layer
    /// is the output layer and should map to a single `Exp` neuron.
    pub fn new(layer_configs: Vec<LayerConfig>, loss: Loss) -> Self {
        if layer_configs.is_empty() {
            panic!("At least one layer is required");
        }

        let mut layers: Vec<Box<dyn Layer>> = Vec::new();
        for config in layer_configs {
            layers.push(Box::new(DenseLayer::new(
                config.inputs,
                config.neurons,
                config.activation,
            )));

            if let Some(rate) = config.dropout {
                layers.push(Box::new(DropoutLayer::new(config.neurons, rate)));
            }
        }

        Model { layers, loss }
    }

    /// The Poisson GLM graph: one dense layer with the exponential
    /// response, no hidden units.
    pub fn glm(n_features: usize) -> Self {
        Model::new(
            vec![LayerConfig {
                inputs: n_features,
                neurons: 1,
                activation: ActivationType::Exp,
                dropout: None,
            }],
            Loss::PoissonDeviance,
        )
    }

    pub fn forward(&mut self, input: &Array1<f32>) -> Array1<f32> {
        let mut current_input = input.clone();
        for layer in &mut self.layers {
            current_input = layer.forward(&current_input);
        }
        current_input
    }

    /// Expected claim count for one policy. Exposure enters as a
    /// multiplicative offset on the response scale: mu = exposure * exp(eta).
    pub fn predict(&mut self, input: &Array1<f32>, exposure: f32) -> f32 {
        exposure * self.forward(input)[0]
    }

    /// Backpropagates an output gradient through the layer stack. Each
    /// layer receives the activation cache of the layer below it.
    pub fn backward(&mut self, input: &Array1<f32>, output_grad: &Array1<f32>) {
        let mut grad = output_grad.clone();
        for i in (0..self.layers.len()).rev() {
            let prev_cache = if i > 0 {
                Some(self.layers[i - 1].params().activation_cache.clone())
            } else {
                None
            };
            grad = self.layers[i].backward(input, &grad, prev_cache.as_ref());
        }
    }

    /// One forward/backward pass for a single policy. Returns its deviance
    /// contribution. The output gradient is mu - y: with the log link the
    /// exposure offset only shifts eta, so d(dev)/d(eta) = 2(mu - y) and
    /// the constant 2 folds into the learning rate.
    fn train_sample(&mut self, input: &Array1<f32>, exposure: f32, target: f32) -> f32 {
        let output = self.forward(input);
        let mu = exposure * output[0];
        let loss = self.loss.calculate(&array![mu], &array![target]);
        self.backward(input, &array![mu - target]);
        loss
    }

    /// Trains on one batch: accumulate gradients over the batch, average,
    /// apply one optimizer step. Returns the mean deviance over the batch.
    pub fn train_batch(
        &mut self,
        inputs: &[Array1<f32>],
        exposures: &[f32],
        targets: &[f32],
        optimizer: &Optimizer,
    ) -> f32 {
        self.zero_gradients();
        let mut total_loss: f32 = 0.0;
        for ((input, &exposure), &target) in
            inputs.iter().zip(exposures.iter()).zip(targets.iter())
        {
            total_loss += self.train_sample(input, exposure, target);
        }

        let batch_size = inputs.len() as f32;
        for layer in &mut self.layers {
            let params = layer.params_mut();
            params.weight_grads = &params.weight_grads / batch_size;
            params.bias_grads = &params.bias_grads / batch_size;
        }

        optimizer.step(&mut self.layers);
        total_loss / batch_size
    }

    /// Full training loop: shuffle each epoch with a seeded RNG, run every
    /// batch, log the epoch's mean deviance. Leaves the model in
    /// evaluation mode.
    pub fn train(
        &mut self,
        inputs: &[Array1<f32>],
        exposures: &[f32],
        targets: &[f32],
        config: &TrainConfig,
    ) {
        assert_eq!(inputs.len(), exposures.len());
        assert_eq!(inputs.len(), targets.len());

        let optimizer = Optimizer::new(config.learning_rate);
        let mut rng = fastrand::Rng::with_seed(config.seed);
        let mut indices: Vec<usize> = (0..inputs.len()).collect();

        self.set_training(true);
        for epoch in 0..config.epochs {
            rng.shuffle(&mut indices);

            let mut epoch_loss = 0.0;
            let mut batches = 0;
            for chunk in indices.chunks(config.batch_size) {
                let batch_inputs: Vec<Array1<f32>> =
                    chunk.iter().map(|&i| inputs[i].clone()).collect();
                let batch_exposures: Vec<f32> = chunk.iter().map(|&i| exposures[i]).collect();
                let batch_targets: Vec<f32> = chunk.iter().map(|&i| targets[i]).collect();

                epoch_loss +=
                    self.train_batch(&batch_inputs, &batch_exposures, &batch_targets, &optimizer);
                batches += 1;
            }

            println!(
                "Epoch {} / {}, mean deviance: {:.6}",
                epoch + 1,
                config.epochs,
                epoch_loss / batches as f32
            );
        }
        self.set_training(false);
    }

    /// Switches every dropout layer between training and evaluation mode
    pub fn set_training(&mut self, is_training: bool) {
        for layer in &mut self.layers {
            if let Some(dropout) = layer.as_any_mut().downcast_mut::<DropoutLayer>() {
                dropout.set_training(is_training);
            }
        }
    }

    pub fn zero_gradients(&mut self) {
        for layer in &mut self.layers {
            let params = layer.params_mut();
            params.weight_grads.fill(0.0);
            params.bias_grads.fill(0.0);
        }
    }

    pub fn parameter_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.parameter_count()).sum()
    }
}

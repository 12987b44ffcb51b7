/// Enum representing different activation function types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActivationType {
    Tanh,
    ReLU,
    Linear,
    /// Exponential response function of the log link. Output layers use this
    /// so predicted claim counts stay strictly positive.
    Exp,
}

impl ActivationType {
    /// Applies the activation function to a given input
    pub fn apply(&self, x: f32) -> f32 {
        match self {
            ActivationType::Tanh => x.tanh(),
            ActivationType::ReLU => x.max(0.0),
            ActivationType::Linear => x,
            ActivationType::Exp => x.exp(),
        }
    }

    /// Computes the derivative of the activation function
    pub fn derivative(&self, x: f32) -> f32 {
        match self {
            ActivationType::Tanh => 1.0 - x.tanh().powi(2),
            ActivationType::ReLU => if x > 0.0 { 1.0 } else { 0.0 },
            ActivationType::Linear => 1.0,
            ActivationType::Exp => x.exp(),
        }
    }
}

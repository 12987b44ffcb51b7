use ndarray::Array1;

/// Floor for predicted means so the deviance never evaluates ln(0).
const MU_EPSILON: f32 = 1e-10;

#[derive(Debug, Clone)]
pub enum Loss {
    /// Poisson deviance: 2 * (mu - y + y * ln(y / mu)) per sample.
    /// The y * ln(y / mu) term is zero when y = 0.
    PoissonDeviance,
}

impl Loss {
    pub fn calculate(&self, prediction: &Array1<f32>, target: &Array1<f32>) -> f32 {
        match self {
            Loss::PoissonDeviance => {
                prediction
                    .iter()
                    .zip(target.iter())
                    .map(|(&mu, &y)| poisson_deviance(mu, y))
                    .sum()
            }
        }
    }
}

/// Unit deviance of a single observation under the Poisson family.
pub fn poisson_deviance(mu: f32, y: f32) -> f32 {
    let mu = mu.max(MU_EPSILON);
    if y > 0.0 {
        2.0 * (mu - y + y * (y / mu).ln())
    } else {
        2.0 * mu
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_deviance_zero_at_perfect_fit() {
        assert!(poisson_deviance(3.0, 3.0).abs() < 1e-6);
        assert!(poisson_deviance(0.5, 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_deviance_positive_off_fit() {
        assert!(poisson_deviance(1.0, 3.0) > 0.0);
        assert!(poisson_deviance(3.0, 1.0) > 0.0);
    }

    #[test]
    fn test_deviance_zero_count_is_finite() {
        // y = 0 must not produce 0 * ln(0)
        let d = poisson_deviance(0.7, 0.0);
        assert!(d.is_finite());
        assert!((d - 1.4).abs() < 1e-6);
    }

    #[test]
    fn test_deviance_tiny_mu_is_finite() {
        assert!(poisson_deviance(0.0, 1.0).is_finite());
    }

    #[test]
    fn test_loss_sums_over_samples() {
        let loss = Loss::PoissonDeviance;
        let mu = array![1.0, 2.0];
        let y = array![1.0, 2.0];
        assert!(loss.calculate(&mu, &y).abs() < 1e-6);

        let y_off = array![0.0, 2.0];
        let expected = poisson_deviance(1.0, 0.0);
        assert!((loss.calculate(&mu, &y_off) - expected).abs() < 1e-6);
    }
}

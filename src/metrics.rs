use crate::loss::poisson_deviance;

/// Mean Poisson deviance over a set of predictions. This is the held-out
/// score the walkthrough reports for every model.
pub fn mean_poisson_deviance(predictions: &[f32], targets: &[f32]) -> f32 {
    assert_eq!(
        predictions.len(),
        targets.len(),
        "Predictions and targets must have the same length"
    );
    assert!(!predictions.is_empty(), "Cannot score an empty set");

    let total: f32 = predictions
        .iter()
        .zip(targets.iter())
        .map(|(&mu, &y)| poisson_deviance(mu, y))
        .sum();
    total / predictions.len() as f32
}

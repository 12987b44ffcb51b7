//! Claim-frequency walkthrough: fits a Poisson GLM and feed-forward
//! networks with one to four hidden layers to the French MTPL frequency
//! data, then compares mean Poisson deviance on held-out policies.
//!
//! Usage: claim_frequency <path-to-freMTPL2freq.csv>

use std::env;
use std::error::Error;
use std::fs::File;
use std::io::BufReader;

use ndarray::Array1;

use claimfreq::data::{clean_policies, load_policies, train_test_split, FeatureMap, PolicyRecord};
use claimfreq::metrics::mean_poisson_deviance;
use claimfreq::{ActivationType, LayerConfig, Loss, Model, TrainConfig};

const TEST_FRACTION: f32 = 0.1;
const SPLIT_SEED: u64 = 100;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| "data/freMTPL2freq.csv".to_string());

    println!("Loading {}", path);
    let file = File::open(&path)?;
    let mut records = load_policies(BufReader::new(file))?;
    clean_policies(&mut records);
    println!("{} policies loaded", records.len());

    let (train, test) = train_test_split(records, TEST_FRACTION, SPLIT_SEED);
    println!("{} train / {} test", train.len(), test.len());

    let features = FeatureMap::fit(&train)?;
    let train_inputs = features.transform(&train)?;
    let test_inputs = features.transform(&test)?;
    let width = features.width();
    println!("{} input features", width);

    let train_exposures: Vec<f32> = train.iter().map(|r| r.exposure).collect();
    let train_targets: Vec<f32> = train.iter().map(|r| r.claim_count as f32).collect();
    let test_targets: Vec<f32> = test.iter().map(|r| r.claim_count as f32).collect();

    // Every model trains with the same optimizer settings
    let config = TrainConfig {
        learning_rate: 0.01,
        epochs: 50,
        batch_size: 64,
        seed: 42,
    };

    let mut results: Vec<(String, usize, f32)> = Vec::new();

    // Homogeneous baseline: one frequency for the whole portfolio
    let portfolio_frequency: f32 = train_targets.iter().sum::<f32>()
        / train_exposures.iter().sum::<f32>();
    let baseline: Vec<f32> = test.iter().map(|r| r.exposure * portfolio_frequency).collect();
    results.push((
        "homogeneous".to_string(),
        1,
        mean_poisson_deviance(&baseline, &test_targets),
    ));

    for (name, mut model) in build_models(width) {
        println!("\n=== Training {} ({} parameters) ===", name, model.parameter_count());
        model.train(&train_inputs, &train_exposures, &train_targets, &config);

        let predictions = predict_all(&mut model, &test_inputs, &test);
        let deviance = mean_poisson_deviance(&predictions, &test_targets);
        results.push((name, model.parameter_count(), deviance));
    }

    println!("\n{:<16} {:>10} {:>20}", "model", "params", "test mean deviance");
    for (name, params, deviance) in &results {
        println!("{:<16} {:>10} {:>20.6}", name, params, deviance);
    }

    Ok(())
}

fn predict_all(
    model: &mut Model,
    inputs: &[Array1<f32>],
    records: &[PolicyRecord],
) -> Vec<f32> {
    model.set_training(false);
    inputs
        .iter()
        .zip(records.iter())
        .map(|(input, record)| model.predict(input, record.exposure))
        .collect()
}

/// The model ladder of the walkthrough: the GLM, then networks of
/// increasing depth with hidden sizes 20, 15, 10, 5 and tanh units. The
/// deeper nets carry a light dropout after each hidden layer.
fn build_models(width: usize) -> Vec<(String, Model)> {
    let hidden = |inputs, neurons, dropout| LayerConfig {
        inputs,
        neurons,
        activation: ActivationType::Tanh,
        dropout,
    };
    let output = |inputs| LayerConfig {
        inputs,
        neurons: 1,
        activation: ActivationType::Exp,
        dropout: None,
    };

    vec![
        ("glm".to_string(), Model::glm(width)),
        (
            "net-1".to_string(),
            Model::new(
                vec![hidden(width, 20, None), output(20)],
                Loss::PoissonDeviance,
            ),
        ),
        (
            "net-2".to_string(),
            Model::new(
                vec![hidden(width, 20, None), hidden(20, 15, None), output(15)],
                Loss::PoissonDeviance,
            ),
        ),
        (
            "net-3".to_string(),
            Model::new(
                vec![
                    hidden(width, 20, Some(0.05)),
                    hidden(20, 15, Some(0.05)),
                    hidden(15, 10, Some(0.05)),
                    output(10),
                ],
                Loss::PoissonDeviance,
            ),
        ),
        (
            "net-4".to_string(),
            Model::new(
                vec![
                    hidden(width, 20, Some(0.05)),
                    hidden(20, 15, Some(0.05)),
                    hidden(15, 10, Some(0.05)),
                    hidden(10, 5, Some(0.05)),
                    output(5),
                ],
                Loss::PoissonDeviance,
            ),
        ),
    ]
}

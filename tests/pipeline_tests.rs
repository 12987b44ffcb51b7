//! End-to-end check of the walkthrough pipeline on a small in-memory
//! sample: load, clean, split, build features, train, score.

use claimfreq::data::{clean_policies, load_policies, train_test_split, FeatureMap};
use claimfreq::metrics::mean_poisson_deviance;
use claimfreq::{Model, TrainConfig};

const SAMPLE_CSV: &str = "\
IDpol,ClaimNb,Exposure,Area,VehPower,VehAge,DrivAge,BonusMalus,VehBrand,VehGas,Density,Region
1,1,0.10,D,5,0,55,50,B12,Regular,1217,R82
3,1,0.77,D,5,0,55,50,B12,Regular,1217,R82
5,0,0.75,B,6,2,52,50,B12,Diesel,54,R22
10,0,0.09,B,7,0,46,50,B12,Diesel,76,R72
11,0,0.84,B,7,0,46,50,B12,Diesel,76,R72
13,0,0.52,E,6,2,38,50,B12,Regular,3003,R31
15,0,0.45,E,6,2,38,50,B12,Regular,3003,R31
17,0,0.27,C,7,0,33,68,B12,Diesel,137,R91
18,0,0.71,C,7,0,33,68,B12,Diesel,137,R91
21,1,0.15,B,7,0,41,50,B12,Diesel,60,R52
25,0,0.75,B,6,2,45,50,B12,Diesel,60,R52
27,2,0.87,D,7,4,50,60,B12,Regular,695,R82
";

#[test]
fn test_full_pipeline_on_sample() {
    let mut records = load_policies(SAMPLE_CSV.as_bytes()).unwrap();
    clean_policies(&mut records);
    assert_eq!(records.len(), 12);

    // Fit features on the full sample so the held-out rows carry no
    // unseen categories in a dataset this small
    let features = FeatureMap::fit(&records).unwrap();
    let (train, test) = train_test_split(records, 0.25, 11);
    assert_eq!(test.len(), 3);

    let train_inputs = features.transform(&train).unwrap();
    let test_inputs = features.transform(&test).unwrap();

    let train_exposures: Vec<f32> = train.iter().map(|r| r.exposure).collect();
    let train_targets: Vec<f32> = train.iter().map(|r| r.claim_count as f32).collect();
    let test_targets: Vec<f32> = test.iter().map(|r| r.claim_count as f32).collect();

    let mut model = Model::glm(features.width());
    let config = TrainConfig {
        learning_rate: 0.05,
        epochs: 30,
        batch_size: 4,
        seed: 9,
    };
    model.train(&train_inputs, &train_exposures, &train_targets, &config);

    let predictions: Vec<f32> = test_inputs
        .iter()
        .zip(test.iter())
        .map(|(input, record)| model.predict(input, record.exposure))
        .collect();

    for &mu in &predictions {
        assert!(mu.is_finite());
        assert!(mu > 0.0);
    }

    let deviance = mean_poisson_deviance(&predictions, &test_targets);
    assert!(deviance.is_finite());
    assert!(deviance >= 0.0);
}

//! The French motor third-party-liability frequency dataset: CSV loading,
//! the cleaning steps the source case study applies, the train/test split,
//! and assembly of the model design matrix.

use std::error::Error;
use std::fmt;
use std::io;

use csv::ReaderBuilder;
use ndarray::{Array1, Array2, Axis};

use crate::preprocessing::{
    FittedOneHot, FittedScaler, OneHotEncoder, PreprocessingError, StandardScaler,
};

/// Claim counts above this are treated as data errors and capped, as the
/// source case study does.
const CLAIM_CAP: u32 = 4;

/// One policy row of the frequency dataset
#[derive(Debug, Clone)]
pub struct PolicyRecord {
    /// Number of claims during the exposure period
    pub claim_count: u32,
    /// Exposure in policy-years
    pub exposure: f32,
    /// Area code (categorical, "A".."F")
    pub area: String,
    /// Power of the car
    pub vehicle_power: f32,
    /// Age of the car in years
    pub vehicle_age: f32,
    /// Age of the driver in years
    pub driver_age: f32,
    /// French bonus-malus level (100 is the reference)
    pub bonus_malus: f32,
    /// Car brand (categorical)
    pub vehicle_brand: String,
    /// Fuel type, diesel or regular (categorical)
    pub fuel: String,
    /// Inhabitants per km2 in the policyholder's city
    pub density: f32,
    /// French region of the policy (categorical)
    pub region: String,
}

/// Error type for dataset loading
#[derive(Debug)]
pub enum DataError {
    Csv(csv::Error),
    Io(io::Error),
    /// A field failed to parse; carries the column name and offending value
    Parse { column: &'static str, value: String },
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataError::Csv(e) => write!(f, "CSV error: {}", e),
            DataError::Io(e) => write!(f, "I/O error: {}", e),
            DataError::Parse { column, value } => {
                write!(f, "Could not parse column {} from {:?}", column, value)
            }
        }
    }
}

impl Error for DataError {}

impl From<csv::Error> for DataError {
    fn from(e: csv::Error) -> Self {
        DataError::Csv(e)
    }
}

impl From<io::Error> for DataError {
    fn from(e: io::Error) -> Self {
        DataError::Io(e)
    }
}

fn parse_field<T: std::str::FromStr>(
    field: &str,
    column: &'static str,
) -> Result<T, DataError> {
    field.trim().parse().map_err(|_| DataError::Parse {
        column,
        value: field.to_string(),
    })
}

/// Loads policy records from FreMTPL2freq-style CSV. Expected columns:
/// IDpol, ClaimNb, Exposure, Area, VehPower, VehAge, DrivAge, BonusMalus,
/// VehBrand, VehGas, Density, Region.
pub fn load_policies<R: io::Read>(reader: R) -> Result<Vec<PolicyRecord>, DataError> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let mut records = Vec::new();
    for result in rdr.records() {
        let record = result?;
        records.push(PolicyRecord {
            claim_count: parse_field(&record[1], "ClaimNb")?,
            exposure: parse_field(&record[2], "Exposure")?,
            area: record[3].trim().to_string(),
            vehicle_power: parse_field(&record[4], "VehPower")?,
            vehicle_age: parse_field(&record[5], "VehAge")?,
            driver_age: parse_field(&record[6], "DrivAge")?,
            bonus_malus: parse_field(&record[7], "BonusMalus")?,
            vehicle_brand: record[8].trim().to_string(),
            fuel: record[9].trim().to_string(),
            density: parse_field(&record[10], "Density")?,
            region: record[11].trim().to_string(),
        });
    }

    Ok(records)
}

/// The cleaning steps from the source case study: cap claim counts at 4
/// and clamp exposures into (0, 1].
pub fn clean_policies(records: &mut [PolicyRecord]) {
    for record in records.iter_mut() {
        record.claim_count = record.claim_count.min(CLAIM_CAP);
        record.exposure = record.exposure.clamp(f32::EPSILON, 1.0);
    }
}

/// Deterministic shuffled split into (train, test)
pub fn train_test_split(
    mut records: Vec<PolicyRecord>,
    test_fraction: f32,
    seed: u64,
) -> (Vec<PolicyRecord>, Vec<PolicyRecord>) {
    assert!(
        (0.0..1.0).contains(&test_fraction),
        "Test fraction must be between 0 and 1"
    );

    let mut rng = fastrand::Rng::with_seed(seed);
    rng.shuffle(&mut records);

    let test_len = (records.len() as f32 * test_fraction).round() as usize;
    let train = records.split_off(test_len);
    (train, records)
}

/// Maps policy records to model inputs: standard-scaled continuous rating
/// factors (vehicle power, vehicle age, driver age, bonus-malus, log
/// density) followed by one-hot encodings of area, brand, fuel and region.
/// Fit on training records only.
pub struct FeatureMap {
    scaler: FittedScaler,
    area: FittedOneHot,
    brand: FittedOneHot,
    fuel: FittedOneHot,
    region: FittedOneHot,
}

fn continuous_matrix(records: &[PolicyRecord]) -> Array2<f32> {
    let mut out = Array2::zeros((records.len(), 5));
    for (i, r) in records.iter().enumerate() {
        out[[i, 0]] = r.vehicle_power;
        out[[i, 1]] = r.vehicle_age;
        out[[i, 2]] = r.driver_age;
        out[[i, 3]] = r.bonus_malus;
        // density is heavily right-skewed; the case study models its log
        out[[i, 4]] = r.density.max(1.0).ln();
    }
    out
}

fn column<F: Fn(&PolicyRecord) -> &str>(records: &[PolicyRecord], f: F) -> Vec<String> {
    records.iter().map(|r| f(r).to_string()).collect()
}

impl FeatureMap {
    pub fn fit(records: &[PolicyRecord]) -> Result<Self, PreprocessingError> {
        if records.is_empty() {
            return Err(PreprocessingError::EmptyData(
                "Cannot fit FeatureMap on empty data".to_string(),
            ));
        }

        let scaler = StandardScaler::fit(&continuous_matrix(records))?;
        let area = OneHotEncoder::fit(&column(records, |r| &r.area))?;
        let brand = OneHotEncoder::fit(&column(records, |r| &r.vehicle_brand))?;
        let fuel = OneHotEncoder::fit(&column(records, |r| &r.fuel))?;
        let region = OneHotEncoder::fit(&column(records, |r| &r.region))?;

        Ok(FeatureMap {
            scaler,
            area,
            brand,
            fuel,
            region,
        })
    }

    /// Total number of input features per policy
    pub fn width(&self) -> usize {
        5 + self.area.width() + self.brand.width() + self.fuel.width() + self.region.width()
    }

    pub fn transform(
        &self,
        records: &[PolicyRecord],
    ) -> Result<Vec<Array1<f32>>, PreprocessingError> {
        let scaled = self.scaler.transform(&continuous_matrix(records))?;

        let mut inputs = Vec::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            let mut features = Vec::with_capacity(self.width());
            features.extend(scaled.index_axis(Axis(0), i).iter().copied());
            features.extend(self.area.encode(&record.area)?);
            features.extend(self.brand.encode(&record.vehicle_brand)?);
            features.extend(self.fuel.encode(&record.fuel)?);
            features.extend(self.region.encode(&record.region)?);
            inputs.push(Array1::from_vec(features));
        }
        Ok(inputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CSV: &str = "\
IDpol,ClaimNb,Exposure,Area,VehPower,VehAge,DrivAge,BonusMalus,VehBrand,VehGas,Density,Region
1,1,0.10,D,5,0,55,50,B12,Regular,1217,R82
3,1,0.77,D,5,0,55,50,B12,Regular,1217,R82
5,0,0.75,B,6,2,52,50,B12,Diesel,54,R22
10,0,0.09,B,7,0,46,50,B12,Diesel,76,R72
11,0,0.84,B,7,0,46,50,B12,Diesel,76,R72
13,0,0.52,E,6,2,38,50,B12,Regular,3003,R31
15,7,1.50,E,6,2,38,50,B12,Regular,3003,R31
";

    #[test]
    fn test_load_policies() {
        let records = load_policies(SAMPLE_CSV.as_bytes()).unwrap();
        assert_eq!(records.len(), 7);
        assert_eq!(records[0].claim_count, 1);
        assert_eq!(records[0].area, "D");
        assert_eq!(records[2].fuel, "Diesel");
        assert!((records[5].density - 3003.0).abs() < 1e-3);
    }

    #[test]
    fn test_load_rejects_bad_field() {
        let csv = "IDpol,ClaimNb,Exposure,Area,VehPower,VehAge,DrivAge,BonusMalus,VehBrand,VehGas,Density,Region\n1,x,0.1,D,5,0,55,50,B12,Regular,1217,R82\n";
        let err = load_policies(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::Parse { column: "ClaimNb", .. }));
    }

    #[test]
    fn test_clean_caps_claims_and_exposure() {
        let mut records = load_policies(SAMPLE_CSV.as_bytes()).unwrap();
        clean_policies(&mut records);
        assert_eq!(records[6].claim_count, 4);
        assert!(records[6].exposure <= 1.0);
        for r in &records {
            assert!(r.exposure > 0.0);
        }
    }

    #[test]
    fn test_split_is_deterministic_and_disjoint() {
        let records = load_policies(SAMPLE_CSV.as_bytes()).unwrap();
        let (train_a, test_a) = train_test_split(records.clone(), 0.3, 7);
        let (train_b, test_b) = train_test_split(records, 0.3, 7);

        assert_eq!(train_a.len() + test_a.len(), 7);
        assert_eq!(test_a.len(), 2);
        assert_eq!(train_a.len(), train_b.len());
        for (a, b) in test_a.iter().zip(test_b.iter()) {
            assert_eq!(a.claim_count, b.claim_count);
            assert_eq!(a.exposure, b.exposure);
        }
    }

    #[test]
    fn test_feature_map_width_and_transform() {
        let records = load_policies(SAMPLE_CSV.as_bytes()).unwrap();
        let map = FeatureMap::fit(&records).unwrap();

        // 5 continuous + area {B,D,E} + brand {B12} + fuel {Diesel,Regular}
        // + region {R22,R31,R72,R82}
        assert_eq!(map.width(), 5 + 3 + 1 + 2 + 4);

        let inputs = map.transform(&records).unwrap();
        assert_eq!(inputs.len(), 7);
        for input in &inputs {
            assert_eq!(input.len(), map.width());
        }
    }

    #[test]
    fn test_feature_map_unknown_category() {
        let records = load_policies(SAMPLE_CSV.as_bytes()).unwrap();
        let map = FeatureMap::fit(&records[..3]).unwrap();
        // records[5] is area E, unseen in the first three rows
        assert!(map.transform(&records[5..]).is_err());
    }
}

use crate::error::PredictError;
use crate::models::{FeatureVector, OrdinalLevel, PatientRecord};

pub fn calculate_bmi(weight_kg: f64, height_cm: f64) -> Result<f64, PredictError> {
    if height_cm <= 0.0 {
        return Err(PredictError::invalid_field(
            "height",
            "must be positive to derive BMI",
        ));
    }
    let height_m = height_cm / 100.0;
    Ok(weight_kg / (height_m * height_m))
}

pub fn validate_record(record: &PatientRecord) -> Result<(), PredictError> {
    check_range("age", record.age, 1, 120)?;
    if record.gender != 1 && record.gender != 2 {
        return Err(PredictError::invalid_field(
            "gender",
            "must be 1 (female) or 2 (male)",
        ));
    }
    check_range("height", record.height, 50, 250)?;
    if !(10.0..=200.0).contains(&record.weight) {
        return Err(PredictError::invalid_field(
            "weight",
            "must be between 10 and 200",
        ));
    }
    check_range("ap_hi", record.ap_hi, 50, 250)?;
    check_range("ap_lo", record.ap_lo, 30, 150)?;
    if OrdinalLevel::from_code(record.cholesterol).is_none() {
        return Err(PredictError::invalid_field(
            "cholesterol",
            "must be 1, 2 or 3",
        ));
    }
    if OrdinalLevel::from_code(record.gluc).is_none() {
        return Err(PredictError::invalid_field("gluc", "must be 1, 2 or 3"));
    }
    check_flag("smoke", record.smoke)?;
    check_flag("alco", record.alco)?;
    check_flag("active", record.active)?;
    Ok(())
}

fn check_range(field: &str, value: i32, min: i32, max: i32) -> Result<(), PredictError> {
    if value < min || value > max {
        return Err(PredictError::invalid_field(
            field,
            format!("must be between {min} and {max}"),
        ));
    }
    Ok(())
}

fn check_flag(field: &str, value: i32) -> Result<(), PredictError> {
    if value != 0 && value != 1 {
        return Err(PredictError::invalid_field(field, "must be 0 or 1"));
    }
    Ok(())
}

// Age passes through in years. The artifact contract requires the scaler
// statistics to be expressed over age in years as well.
pub fn derive_features(record: &PatientRecord) -> Result<FeatureVector, PredictError> {
    validate_record(record)?;
    let bmi = calculate_bmi(record.weight, record.height as f64)?;

    Ok(FeatureVector([
        record.age as f64,
        record.gender as f64,
        record.height as f64,
        record.weight,
        record.ap_hi as f64,
        record.ap_lo as f64,
        record.cholesterol as f64,
        record.gluc as f64,
        record.smoke as f64,
        record.alco as f64,
        record.active as f64,
        bmi,
    ]))
}

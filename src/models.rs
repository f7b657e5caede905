use serde::{Deserialize, Serialize};

pub const FEATURE_COUNT: usize = 12;

pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "age_years",
    "gender",
    "height",
    "weight",
    "ap_hi",
    "ap_lo",
    "cholesterol",
    "gluc",
    "smoke",
    "alco",
    "active",
    "bmi",
];

pub const FEATURE_DISPLAY_NAMES: [&str; FEATURE_COUNT] = [
    "Age",
    "Gender",
    "Height",
    "Weight",
    "AP Hi",
    "AP Lo",
    "Cholesterol",
    "Glucose",
    "Smoke",
    "Alcohol",
    "Active",
    "BMI",
];

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PatientRecord {
    pub age: i32,
    pub gender: i32,
    pub height: i32,
    pub weight: f64,
    pub ap_hi: i32,
    pub ap_lo: i32,
    pub cholesterol: i32,
    pub gluc: i32,
    pub smoke: i32,
    pub alco: i32,
    pub active: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    pub fn bmi(&self) -> f64 {
        self.0[FEATURE_COUNT - 1]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrdinalLevel {
    Normal,
    AboveNormal,
    High,
}

impl OrdinalLevel {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(OrdinalLevel::Normal),
            2 => Some(OrdinalLevel::AboveNormal),
            3 => Some(OrdinalLevel::High),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OrdinalLevel::Normal => "Normal",
            OrdinalLevel::AboveNormal => "Above Normal",
            OrdinalLevel::High => "High",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub factor: String,
    pub value: String,
    pub status: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskVerdict {
    pub label: u8,
    pub probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAnalysis {
    pub bmi: f64,
    pub risk_factors: Vec<RiskFactor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionReport {
    pub risk_prediction: u8,
    pub risk_probability: f64,
    pub message: String,
    pub analysis: RiskAnalysis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub model_type: String,
    pub accuracy: f64,
    pub feature_importances: Vec<FeatureImportance>,
}

use std::path::Path;

use crate::annotate;
use crate::artifacts::{ForestModel, Scaler};
use crate::error::{ArtifactError, PredictError};
use crate::features;
use crate::models::{
    FeatureImportance, FeatureVector, ModelInfo, PatientRecord, PredictionReport, RiskAnalysis,
    RiskVerdict, FEATURE_DISPLAY_NAMES,
};

#[derive(Debug)]
pub struct PredictionService {
    scaler: Scaler,
    model: ForestModel,
}

impl PredictionService {
    pub fn new(scaler: Scaler, model: ForestModel) -> Self {
        PredictionService { scaler, model }
    }

    pub fn load(model_path: &Path, scaler_path: &Path) -> Result<Self, ArtifactError> {
        let scaler = Scaler::load(scaler_path)?;
        let model = ForestModel::load(model_path)?;
        Ok(PredictionService::new(scaler, model))
    }

    fn classify(&self, vector: &FeatureVector) -> Result<RiskVerdict, PredictError> {
        let scaled = self.scaler.transform(vector);
        let probability = self.model.positive_probability(&scaled);
        if !probability.is_finite() {
            return Err(PredictError::Internal(
                "classifier produced a non-finite probability".to_string(),
            ));
        }
        let label = u8::from(probability >= self.model.decision_threshold);
        Ok(RiskVerdict { label, probability })
    }

    pub fn predict(&self, record: &PatientRecord) -> Result<PredictionReport, PredictError> {
        let vector = features::derive_features(record)?;
        let verdict = self.classify(&vector)?;

        let bmi = vector.bmi();
        let risk_factors = annotate::annotate(record, bmi);
        let message = if verdict.label == 1 {
            "High Risk"
        } else {
            "Low Risk"
        };

        Ok(PredictionReport {
            risk_prediction: verdict.label,
            risk_probability: verdict.probability,
            message: message.to_string(),
            analysis: RiskAnalysis {
                bmi: (bmi * 10.0).round() / 10.0,
                risk_factors,
            },
        })
    }

    pub fn model_info(&self) -> ModelInfo {
        let mut feature_importances: Vec<FeatureImportance> = FEATURE_DISPLAY_NAMES
            .iter()
            .zip(&self.model.feature_importances)
            .map(|(feature, importance)| FeatureImportance {
                feature: feature.to_string(),
                importance: *importance,
            })
            .collect();
        feature_importances.sort_by(|a, b| {
            b.importance
                .partial_cmp(&a.importance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        ModelInfo {
            model_type: self.model.model_type.clone(),
            accuracy: self.model.accuracy,
            feature_importances,
        }
    }
}

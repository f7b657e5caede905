use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::ArtifactError;
use crate::models::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};

#[derive(Debug, Clone, Deserialize)]
pub struct Scaler {
    pub feature_names: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl Scaler {
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let scaler: Scaler = read_json(path)?;
        scaler.validate(path)?;
        info!(path = %path.display(), "scaler artifact loaded");
        Ok(scaler)
    }

    fn validate(&self, path: &Path) -> Result<(), ArtifactError> {
        check_feature_names(path, &self.feature_names)?;
        check_width(path, "mean", self.mean.len())?;
        check_width(path, "scale", self.scale.len())?;
        for (i, value) in self.scale.iter().enumerate() {
            if *value == 0.0 || !value.is_finite() {
                return Err(invalid(
                    path,
                    format!("scale[{i}] ({}) is {value}", FEATURE_NAMES[i]),
                ));
            }
        }
        Ok(())
    }

    pub fn transform(&self, vector: &FeatureVector) -> [f64; FEATURE_COUNT] {
        let mut scaled = [0.0; FEATURE_COUNT];
        for (i, value) in vector.values().iter().enumerate() {
            scaled[i] = (value - self.mean[i]) / self.scale[i];
        }
        scaled
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: [f64; 2],
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    // Load-time validation requires split children to point forward in the
    // array, so the walk strictly advances and must land on a leaf within
    // nodes.len() steps.
    pub fn positive_probability(&self, scaled: &[f64; FEATURE_COUNT]) -> f64 {
        let mut index = 0;
        for _ in 0..self.nodes.len().max(1) {
            match &self.nodes[index] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if scaled[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                TreeNode::Leaf { value } => {
                    let total = value[0] + value[1];
                    return value[1] / total;
                }
            }
        }
        0.0
    }
}

fn default_threshold() -> f64 {
    0.5
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForestModel {
    pub model_type: String,
    pub accuracy: f64,
    pub feature_names: Vec<String>,
    pub feature_importances: Vec<f64>,
    pub trees: Vec<DecisionTree>,
    #[serde(default = "default_threshold")]
    pub decision_threshold: f64,
}

impl ForestModel {
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let model: ForestModel = read_json(path)?;
        model.validate(path)?;
        info!(
            path = %path.display(),
            trees = model.trees.len(),
            "model artifact loaded"
        );
        Ok(model)
    }

    fn validate(&self, path: &Path) -> Result<(), ArtifactError> {
        check_feature_names(path, &self.feature_names)?;
        check_width(path, "feature_importances", self.feature_importances.len())?;
        if self.trees.is_empty() {
            return Err(invalid(path, "model has no trees".to_string()));
        }
        if !(0.0..=1.0).contains(&self.decision_threshold) {
            return Err(invalid(
                path,
                format!("decision_threshold {} outside [0, 1]", self.decision_threshold),
            ));
        }
        for (t, tree) in self.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(invalid(path, format!("tree {t} has no nodes")));
            }
            for (n, node) in tree.nodes.iter().enumerate() {
                match node {
                    TreeNode::Split {
                        feature,
                        left,
                        right,
                        ..
                    } => {
                        if *feature >= FEATURE_COUNT {
                            return Err(invalid(
                                path,
                                format!("tree {t} node {n} splits on feature {feature}"),
                            ));
                        }
                        if *left >= tree.nodes.len() || *right >= tree.nodes.len() {
                            return Err(invalid(
                                path,
                                format!("tree {t} node {n} references a missing child"),
                            ));
                        }
                        // children must come later in the array, which rules
                        // out cycles and matches the flattened export layout
                        if *left <= n || *right <= n {
                            return Err(invalid(
                                path,
                                format!("tree {t} node {n} creates a cycle"),
                            ));
                        }
                    }
                    TreeNode::Leaf { value } => {
                        if value[0] + value[1] <= 0.0 {
                            return Err(invalid(
                                path,
                                format!("tree {t} node {n} has an empty leaf"),
                            ));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    pub fn positive_probability(&self, scaled: &[f64; FEATURE_COUNT]) -> f64 {
        let total: f64 = self
            .trees
            .iter()
            .map(|tree| tree.positive_probability(scaled))
            .sum();
        total / self.trees.len() as f64
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ArtifactError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn check_feature_names(path: &Path, names: &[String]) -> Result<(), ArtifactError> {
    if names.len() != FEATURE_COUNT || names.iter().zip(FEATURE_NAMES).any(|(a, b)| a != b) {
        return Err(invalid(
            path,
            format!(
                "feature names {:?} do not match the expected order {:?}",
                names, FEATURE_NAMES
            ),
        ));
    }
    Ok(())
}

fn check_width(path: &Path, field: &str, len: usize) -> Result<(), ArtifactError> {
    if len != FEATURE_COUNT {
        return Err(invalid(
            path,
            format!("{field} has {len} entries, expected {FEATURE_COUNT}"),
        ));
    }
    Ok(())
}

fn invalid(path: &Path, reason: String) -> ArtifactError {
    ArtifactError::Invalid {
        path: path.to_path_buf(),
        reason,
    }
}

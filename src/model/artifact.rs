use super::regressor::{PredictError, Regressor, check_finite, check_row};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Serialized, pre-fitted model as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub trained_at: Option<DateTime<Utc>>,
    pub features: Vec<String>,
    #[serde(flatten)]
    pub(crate) estimator: Estimator,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(crate) enum Estimator {
    Linear(LinearRegression),
    Forest(RandomForest),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct LinearRegression {
    pub coefficients: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
}

/// Averaging ensemble of regression trees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RandomForest {
    pub trees: Vec<RegressionTree>,
}

/// Flat node table; node 0 is the root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

impl ModelArtifact {
    pub fn from_json(json: &str) -> Result<Self> {
        let artifact: Self = serde_json::from_str(json)?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Checks the artifact is internally consistent and accepts `n_inputs`
    /// columns.
    pub fn validate_inputs(&self, n_inputs: usize) -> Result<()> {
        if self.features.len() != n_inputs {
            return Err(Error::model(format!(
                "model expects {} features ({}) but {} are provided",
                self.features.len(),
                self.features.join(", "),
                n_inputs
            )));
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        if self.features.is_empty() {
            return Err(Error::model("model declares no features"));
        }

        match &self.estimator {
            Estimator::Linear(linear) => {
                if linear.coefficients.len() != self.features.len() {
                    return Err(Error::model(format!(
                        "linear model has {} coefficients for {} features",
                        linear.coefficients.len(),
                        self.features.len()
                    )));
                }
                if linear.coefficients.iter().any(|c| !c.is_finite()) || !linear.intercept.is_finite()
                {
                    return Err(Error::model("linear model has non-finite parameters"));
                }
            }
            Estimator::Forest(forest) => {
                if forest.trees.is_empty() {
                    return Err(Error::model("forest has no trees"));
                }
                for (i, tree) in forest.trees.iter().enumerate() {
                    tree.validate(self.features.len())
                        .map_err(|e| Error::model(format!("tree {}: {}", i, e)))?;
                }
            }
        }

        Ok(())
    }
}

impl RegressionTree {
    fn validate(&self, n_features: usize) -> std::result::Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }

        for (index, node) in self.nodes.iter().enumerate() {
            match *node {
                TreeNode::Split {
                    feature,
                    left,
                    right,
                    threshold,
                } => {
                    if feature >= n_features {
                        return Err(format!(
                            "node {} splits on feature {} but the model has {}",
                            index, feature, n_features
                        ));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {} has a non-finite threshold", index));
                    }
                    // Children must point forward so traversal always terminates.
                    for child in [left, right] {
                        if child <= index || child >= self.nodes.len() {
                            return Err(format!(
                                "node {} has invalid child index {}",
                                index, child
                            ));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(format!("leaf {} has a non-finite value", index));
                    }
                }
            }
        }

        Ok(())
    }

    fn evaluate(&self, row: &[f64]) -> std::result::Result<f64, PredictError> {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                Some(TreeNode::Leaf { value }) => return Ok(*value),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let x = row.get(*feature).ok_or_else(|| PredictError::ShapeMismatch {
                        expected: feature + 1,
                        actual: row.len(),
                    })?;
                    let next = if *x <= *threshold { *left } else { *right };
                    if next <= index {
                        return Err(PredictError::CorruptModel(format!(
                            "node {} points back to node {}",
                            index, next
                        )));
                    }
                    index = next;
                }
                None => {
                    return Err(PredictError::CorruptModel(format!(
                        "node {} does not exist",
                        index
                    )));
                }
            }
        }
    }
}

impl Estimator {
    fn kind(&self) -> &'static str {
        match self {
            Self::Linear(_) => "linear",
            Self::Forest(_) => "forest",
        }
    }

    fn predict_row(&self, row: &[f64]) -> std::result::Result<f64, PredictError> {
        match self {
            Self::Linear(linear) => Ok(linear.intercept
                + linear
                    .coefficients
                    .iter()
                    .zip(row)
                    .map(|(c, x)| c * x)
                    .sum::<f64>()),
            Self::Forest(forest) => {
                if forest.trees.is_empty() {
                    return Err(PredictError::EmptyPrediction);
                }
                let mut total = 0.0;
                for tree in &forest.trees {
                    total += tree.evaluate(row)?;
                }
                Ok(total / forest.trees.len() as f64)
            }
        }
    }
}

impl Regressor for ModelArtifact {
    fn kind(&self) -> &str {
        self.estimator.kind()
    }

    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.estimator.kind())
    }

    fn features(&self) -> &[String] {
        &self.features
    }

    fn predict(&self, rows: &[Vec<f64>]) -> std::result::Result<Vec<f64>, PredictError> {
        rows.iter()
            .map(|row| {
                check_row(row, self.features.len())?;
                check_finite(self.estimator.predict_row(row)?)
            })
            .collect()
    }
}

/// Reads, deserializes and validates the artifact at `path`.
pub async fn load(path: impl AsRef<Path>, n_inputs: usize) -> Result<ModelArtifact> {
    let path = path.as_ref();
    debug!("Loading model artifact from: {}", path.display());

    let bytes = tokio::fs::read(path).await.map_err(|e| {
        Error::model(format!("cannot read model artifact {}: {}", path.display(), e))
    })?;
    let artifact: ModelArtifact = serde_json::from_slice(&bytes)?;
    artifact.validate_inputs(n_inputs)?;

    info!(
        "Loaded {} model '{}' with features [{}]",
        artifact.kind(),
        artifact.name(),
        artifact.features.join(", ")
    );
    if let Some(trained_at) = artifact.trained_at {
        info!("Model trained at {}", trained_at.to_rfc3339());
    }

    Ok(artifact)
}

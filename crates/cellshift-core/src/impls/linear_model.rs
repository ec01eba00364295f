//! LinearModel - JSON で配布される線形スコアラー
//!
//! 本番の学習済みモデルの代わりに CLI とテストで使います。
//! `scores = weights · features + bias`
//!
//! ```json
//! { "weights": [[0.0, 1.0], [0.5, -1.0]], "bias": [0.0, 0.1] }
//! ```
//!
//! `weights` は出力数 × 入力数。すべての行は同じ長さでなければなりません。

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ports::{ModelLoader, ScoreError, Scorer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
}

impl LinearModel {
    pub fn new(weights: Vec<Vec<f64>>, bias: Vec<f64>) -> Result<Self, ScoreError> {
        let model = Self { weights, bias };
        model.validate()?;
        Ok(model)
    }

    pub fn from_json(json: &str) -> Result<Self, ScoreError> {
        let model: Self =
            serde_json::from_str(json).map_err(|e| ScoreError::InvalidArtifact(e.to_string()))?;
        model.validate()?;
        Ok(model)
    }

    pub fn input_len(&self) -> usize {
        self.weights.first().map_or(0, Vec::len)
    }

    pub fn output_len(&self) -> usize {
        self.weights.len()
    }

    fn validate(&self) -> Result<(), ScoreError> {
        if self.weights.is_empty() {
            return Err(ScoreError::InvalidArtifact("model has no outputs".into()));
        }
        if self.bias.len() != self.weights.len() {
            return Err(ScoreError::InvalidArtifact(format!(
                "{} weight rows but {} bias values",
                self.weights.len(),
                self.bias.len()
            )));
        }
        let width = self.input_len();
        if let Some(row) = self.weights.iter().position(|r| r.len() != width) {
            return Err(ScoreError::InvalidArtifact(format!(
                "weight row {row} has {} columns, expected {width}",
                self.weights[row].len()
            )));
        }
        let all_finite = self
            .weights
            .iter()
            .flatten()
            .chain(self.bias.iter())
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(ScoreError::InvalidArtifact("non-finite parameter".into()));
        }
        Ok(())
    }
}

impl Scorer for LinearModel {
    fn score(&self, features: &[f64]) -> Result<Vec<f64>, ScoreError> {
        if features.len() != self.input_len() {
            return Err(ScoreError::InputShape {
                expected: self.input_len(),
                actual: features.len(),
            });
        }
        Ok(self
            .weights
            .iter()
            .zip(&self.bias)
            .map(|(row, b)| row.iter().zip(features).map(|(w, x)| w * x).sum::<f64>() + b)
            .collect())
    }
}

/// JSON ファイルから [`LinearModel`] をロードする
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonModelLoader;

impl ModelLoader for JsonModelLoader {
    fn load(&self, path: &Path) -> Result<Arc<dyn Scorer>, ScoreError> {
        let content = std::fs::read_to_string(path).map_err(|e| ScoreError::Load {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;
        Ok(Arc::new(LinearModel::from_json(&content)?))
    }
}

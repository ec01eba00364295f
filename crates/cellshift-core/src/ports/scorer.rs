//! Scorer port - 学習済みモデルの抽象化
//!
//! Engine はモデルの中身を知りません。`features -> scores` の写像だけを使います。

use std::path::Path;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
    #[error("cannot read model artifact '{path}': {detail}")]
    Load { path: String, detail: String },

    #[error("invalid model artifact: {0}")]
    InvalidArtifact(String),

    #[error("model expects {expected} features, got {actual}")]
    InputShape { expected: usize, actual: usize },

    #[error("{0}")]
    Other(String),
}

/// 中身を知らないスコアリング関数
///
/// `score` は長時間ブロックしうるので、呼び出し側は async executor の外で実行します。
pub trait Scorer: Send + Sync {
    fn score(&self, features: &[f64]) -> Result<Vec<f64>, ScoreError>;
}

/// ディスク上のモデル artifact を [`Scorer`] にする
pub trait ModelLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<Arc<dyn Scorer>, ScoreError>;
}

impl<F> Scorer for F
where
    F: Fn(&[f64]) -> Result<Vec<f64>, ScoreError> + Send + Sync,
{
    fn score(&self, features: &[f64]) -> Result<Vec<f64>, ScoreError> {
        self(features)
    }
}

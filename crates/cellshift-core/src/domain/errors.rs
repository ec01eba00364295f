//! Errors - エラー型と分類
//!
//! 欠損データ（MissingData）はエラー値にはなりません。loader が該当レコードを
//! 除外し、`LoadReport` に数えるだけです。

use std::time::Duration;

use thiserror::Error;

use crate::ports::repository::RepositoryError;
use crate::ports::scorer::ScoreError;

/// ErrorKind は harness 向けの運用分類
///
/// - Configuration: 設定が直るまで `run()` は進めない
/// - Recoverable: 今回の invocation だけ失敗、次の tick で再試行
/// - Bug: ロジックの不変条件違反
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Recoverable,
    Bug,
}

/// スコアリングが使える target を返せなかった理由
#[derive(Debug, Error)]
pub enum InferenceFailure {
    #[error("scorer failed: {0}")]
    Scorer(#[from] ScoreError),

    #[error("scorer did not answer within {0:?}")]
    TimedOut(Duration),

    #[error("scorer returned {actual} values, decode rule expects {expected}")]
    OutputLength { expected: usize, actual: usize },

    #[error("scorer returned a non-finite value at index {0}")]
    NonFiniteOutput(usize),

    #[error("scoring task aborted: {0}")]
    Aborted(String),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("inference failed for {terminal}: {source}")]
    Inference {
        terminal: String,
        #[source]
        source: InferenceFailure,
    },

    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Configuration(_) => ErrorKind::Configuration,
            EngineError::Inference { .. } | EngineError::Repository(_) => ErrorKind::Recoverable,
            EngineError::InvariantViolation(_) => ErrorKind::Bug,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        self.kind() == ErrorKind::Recoverable
    }
}

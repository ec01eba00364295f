//! EngineBuilder - engine の構築とワイヤリング
//!
//! # Fail-fast 設計
//! - repository と decider は必須
//! - build() 時に decider の準備（モデル bind 済みか）を確認
//! - 不足があれば BuildError を返す。最初の run() まで問題を持ち越さない

use std::sync::Arc;
use std::time::Duration;

use super::config::EngineConfig;
use super::emitter::CommandEmitter;
use super::engine::HandoverEngine;
use super::loader::SnapshotLoader;
use crate::domain::EngineError;
use crate::ports::{Clock, DataRepository, Decider, IdGenerator, ModelLoader, SystemClock, UlidGenerator};

/// # 使用例
/// ```ignore
/// let engine = EngineBuilder::new()
///     .repository(repo)
///     .decider(Box::new(DistanceDecider::new()))
///     .max_record_age(Some(Duration::from_secs(5)))
///     .build()?;
/// let commands = engine.run().await?;
/// ```
pub struct EngineBuilder {
    repository: Option<Arc<dyn DataRepository>>,
    decider: Option<Box<dyn Decider>>,
    clock: Option<Arc<dyn Clock>>,
    ids: Option<Arc<dyn IdGenerator>>,
    max_record_age: Option<Duration>,
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("no data repository configured")]
    MissingRepository,

    #[error("no decider configured")]
    MissingDecider,

    #[error("decider '{name}' is not ready: {source}")]
    DeciderNotReady {
        name: String,
        #[source]
        source: EngineError,
    },

    #[error(transparent)]
    Config(EngineError),
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            repository: None,
            decider: None,
            clock: None,
            ids: None,
            max_record_age: None,
        }
    }

    /// `config` から decider を生成（モデルもここでロード）した builder
    ///
    /// ロードの失敗は最初の `run()` より前に分かります。
    pub fn from_config(config: &EngineConfig, models: &dyn ModelLoader) -> Result<Self, BuildError> {
        let decider = config.create_decider(models).map_err(BuildError::Config)?;
        Ok(Self::new()
            .decider(decider)
            .max_record_age(config.max_record_age()))
    }

    pub fn repository(mut self, repository: Arc<dyn DataRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    pub fn decider(mut self, decider: Box<dyn Decider>) -> Self {
        self.decider = Some(decider);
        self
    }

    /// 省略時は [`SystemClock`]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// 省略時は engine の clock を使う [`UlidGenerator`]
    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn max_record_age(mut self, max_age: Option<Duration>) -> Self {
        self.max_record_age = max_age;
        self
    }

    pub fn build(self) -> Result<HandoverEngine, BuildError> {
        let repository = self.repository.ok_or(BuildError::MissingRepository)?;
        let decider = self.decider.ok_or(BuildError::MissingDecider)?;
        decider
            .ensure_ready()
            .map_err(|source| BuildError::DeciderNotReady {
                name: decider.name().to_string(),
                source,
            })?;

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let ids = self
            .ids
            .unwrap_or_else(|| Arc::new(UlidGenerator::new(clock.clone())));

        Ok(HandoverEngine {
            repository,
            decider,
            loader: SnapshotLoader::new(clock.clone()).with_max_record_age(self.max_record_age),
            emitter: CommandEmitter::new(ids.clone(), clock),
            ids,
        })
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//! HandoverEngine - invocation の入口
//!
//! # フロー（1 回の `run()`）
//! 1. Decider の準備確認（モデル未 bind ならここで止まる。repository には触れない）
//! 2. SnapshotLoader で snapshot を構築
//! 3. Decider で decisions を生成
//! 4. CommandEmitter で commands に変換
//!
//! どこかで失敗した場合は command を一つも返しません。

use std::sync::Arc;

use tracing::Instrument;

use super::emitter::CommandEmitter;
use super::loader::SnapshotLoader;
use crate::domain::{EngineError, HandoverCommand, RunId};
use crate::observability::LoadReport;
use crate::ports::{DataRepository, Decider, IdGenerator};

/// 1 回の invocation の結果一式
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub run_id: RunId,
    pub commands: Vec<HandoverCommand>,
    pub report: LoadReport,
}

pub struct HandoverEngine {
    pub(crate) repository: Arc<dyn DataRepository>,
    pub(crate) decider: Box<dyn Decider>,
    pub(crate) loader: SnapshotLoader,
    pub(crate) emitter: CommandEmitter,
    pub(crate) ids: Arc<dyn IdGenerator>,
}

impl HandoverEngine {
    pub fn decider(&self) -> &dyn Decider {
        self.decider.as_ref()
    }

    /// 現在の repository の内容で判断サイクルを 1 回実行
    pub async fn run(&self) -> Result<Vec<HandoverCommand>, EngineError> {
        self.run_with_report().await.map(|output| output.commands)
    }

    pub async fn run_with_report(&self) -> Result<RunOutput, EngineError> {
        self.decider.ensure_ready()?;

        let run_id = self.ids.generate_run_id();
        let span = tracing::info_span!("handover_run", %run_id, strategy = self.decider.name());
        self.cycle(run_id).instrument(span).await
    }

    async fn cycle(&self, run_id: RunId) -> Result<RunOutput, EngineError> {
        let (snapshot, report) = self
            .loader
            .load(self.repository.as_ref(), self.decider.required_metric())
            .await?;

        let decisions = self.decider.decide(&snapshot).await?;

        let commands = decisions
            .iter()
            .map(|d| self.emitter.emit(&snapshot, d, self.decider.name()))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!(
            terminals = snapshot.terminals().len(),
            cells = snapshot.cells().len(),
            excluded = report.total_excluded(),
            commands = commands.len(),
            "handover cycle complete"
        );
        Ok(RunOutput {
            run_id,
            commands,
            report,
        })
    }
}

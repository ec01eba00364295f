//! Decider port - Snapshot から HandoverDecision を生成
//!
//! 距離ベース / 学習モデルベースの両戦略がこの trait を実装します。
//! どちらを使うかは設定時に決まります（`Box<dyn Decider>`）。

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{EngineError, HandoverDecision, MetricKind, Snapshot};

/// Decider は snapshot から handover の判断を行う
///
/// # 設計原則
/// - 判断のみ（current snapshot → decisions）。repository への書き込みはしない
/// - `target == serving` の decision は返さない
#[async_trait]
pub trait Decider: Send + Sync {
    /// この decider が出す command に記録される名前
    fn name(&self) -> &str;

    /// loader が端末ごとに解決すべき測定値
    fn required_metric(&self) -> MetricKind;

    /// repository に触る前に確認される
    ///
    /// 外部リソース（bind 済みモデル）が必要な decider は、足りなければ
    /// [`EngineError::Configuration`] を返します。
    fn ensure_ready(&self) -> Result<(), EngineError> {
        Ok(())
    }

    async fn decide(&self, snapshot: &Snapshot) -> Result<Vec<HandoverDecision>, EngineError>;
}

/// 共有 decider: engine が Box に入れた clone を持ち、harness 側は
/// ハンドルを保持できる（モデルの再 bind など）
#[async_trait]
impl<D: Decider + ?Sized> Decider for Arc<D> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn required_metric(&self) -> MetricKind {
        (**self).required_metric()
    }

    fn ensure_ready(&self) -> Result<(), EngineError> {
        (**self).ensure_ready()
    }

    async fn decide(&self, snapshot: &Snapshot) -> Result<Vec<HandoverDecision>, EngineError> {
        (**self).decide(snapshot).await
    }
}

//! DataRepository port - 端末・基地局の最新状態（読み取り専用）
//!
//! 書き込み（handover を発行したことの記録）は harness の責務です。
//! このクレートからは読むだけです。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ids::{CellId, CellNodeId, Rnti, TerminalNodeId};
use crate::domain::position::Position;

/// 端末の最新状態（保存されたまま）。どのフィールドも欠けうる
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminalState {
    pub serving_cell: Option<CellId>,
    pub rnti: Option<Rnti>,
    pub position: Option<Position>,
    pub loss_db: Option<f64>,
    pub observed_at: DateTime<Utc>,
}

/// cell の最新状態（保存されたまま）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellState {
    pub cell_id: Option<CellId>,
    pub position: Option<Position>,
    pub observed_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// data repository の読み取り契約
///
/// 各呼び出しは独立に応答します。エンティティをまたぐ原子性はありません。
#[async_trait]
pub trait DataRepository: Send + Sync {
    async fn list_active_terminals(&self) -> Result<Vec<TerminalNodeId>, RepositoryError>;

    async fn list_cells(&self) -> Result<Vec<CellNodeId>, RepositoryError>;

    async fn terminal_state(&self, id: TerminalNodeId) -> Result<TerminalState, RepositoryError>;

    async fn cell_state(&self, id: CellNodeId) -> Result<CellState, RepositoryError>;
}

//! Per-invocation records for terminals and cells.
//!
//! Records only exist after the loader has validated the raw repository state:
//! every field here is known to be present and usable.

use serde::{Deserialize, Serialize};

use super::ids::{CellId, CellNodeId, Rnti, TerminalNodeId};
use super::position::Position;

/// Which terminal measurement a decider needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Physical position (nearest-cell decisions).
    Position,
    /// Measured path loss in dB (model-based decisions).
    Loss,
}

/// The terminal measurement carried into a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TerminalMetric {
    Position(Position),
    Loss(f64),
}

impl TerminalMetric {
    pub fn kind(&self) -> MetricKind {
        match self {
            TerminalMetric::Position(_) => MetricKind::Position,
            TerminalMetric::Loss(_) => MetricKind::Loss,
        }
    }

    pub fn position(&self) -> Option<&Position> {
        match self {
            TerminalMetric::Position(p) => Some(p),
            TerminalMetric::Loss(_) => None,
        }
    }

    pub fn loss(&self) -> Option<f64> {
        match self {
            TerminalMetric::Loss(l) => Some(*l),
            TerminalMetric::Position(_) => None,
        }
    }
}

/// One active mobile terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminalRecord {
    pub node_id: TerminalNodeId,
    pub serving_cell: CellId,
    pub rnti: Rnti,
    pub metric: TerminalMetric,
}

impl TerminalRecord {
    pub fn with_position(
        node_id: TerminalNodeId,
        serving_cell: CellId,
        rnti: Rnti,
        position: Position,
    ) -> Self {
        Self {
            node_id,
            serving_cell,
            rnti,
            metric: TerminalMetric::Position(position),
        }
    }

    pub fn with_loss(
        node_id: TerminalNodeId,
        serving_cell: CellId,
        rnti: Rnti,
        loss_db: f64,
    ) -> Self {
        Self {
            node_id,
            serving_cell,
            rnti,
            metric: TerminalMetric::Loss(loss_db),
        }
    }
}

/// One base station / cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellRecord {
    pub node_id: CellNodeId,
    pub cell_id: CellId,
    pub position: Position,
}

impl CellRecord {
    pub fn new(node_id: CellNodeId, cell_id: CellId, position: Position) -> Self {
        Self {
            node_id,
            cell_id,
            position,
        }
    }
}

//! Decision model: which terminal moves to which cell.
//!
//! A decision only records intent. Turning it into a control-plane command
//! (and checking the target is real) is the emitter's job.

use serde::{Deserialize, Serialize};

use super::ids::{CellId, Rnti, TerminalNodeId};
use super::record::TerminalRecord;

/// A terminal should be handed over from its serving cell to `target_cell`.
///
/// Invariant: `target_cell != serving_cell`. Use [`HandoverDecision::between`]
/// to construct one; it returns `None` for a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandoverDecision {
    pub terminal: TerminalNodeId,
    pub rnti: Rnti,
    pub serving_cell: CellId,
    pub target_cell: CellId,
}

impl HandoverDecision {
    /// Decision for `terminal` to move to `target`, or `None` when the
    /// terminal is already served by `target`.
    pub fn between(terminal: &TerminalRecord, target: CellId) -> Option<Self> {
        if terminal.serving_cell == target {
            return None;
        }
        Some(Self {
            terminal: terminal.node_id,
            rnti: terminal.rnti,
            serving_cell: terminal.serving_cell,
            target_cell: target,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::position::Position;

    fn terminal(serving: u16) -> TerminalRecord {
        TerminalRecord::with_position(
            TerminalNodeId::new(1),
            CellId(serving),
            Rnti(5),
            Position::default(),
        )
    }

    #[test]
    fn same_cell_is_not_a_decision() {
        assert_eq!(HandoverDecision::between(&terminal(2), CellId(2)), None);
    }

    #[test]
    fn different_cell_carries_terminal_identity() {
        let d = HandoverDecision::between(&terminal(1), CellId(2)).unwrap();
        assert_eq!(d.terminal, TerminalNodeId::new(1));
        assert_eq!(d.rnti, Rnti(5));
        assert_eq!(d.serving_cell, CellId(1));
        assert_eq!(d.target_cell, CellId(2));
    }
}

//! CommandEmitter - HandoverDecision を control-plane の command に変換

use std::sync::Arc;

use crate::domain::{EngineError, HandoverCommand, HandoverDecision, Snapshot};
use crate::ports::{Clock, IdGenerator};

pub struct CommandEmitter {
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl CommandEmitter {
    pub fn new(ids: Arc<dyn IdGenerator>, clock: Arc<dyn Clock>) -> Self {
        Self { ids, clock }
    }

    /// `decision` を target cell のノード宛て command に変換
    ///
    /// decider は snapshot 内の cell しか選ばないので、cell table にない target は
    /// ロジックのバグとして [`EngineError::InvariantViolation`] を返します。
    pub fn emit(
        &self,
        snapshot: &Snapshot,
        decision: &HandoverDecision,
        issued_by: &str,
    ) -> Result<HandoverCommand, EngineError> {
        let target = snapshot.cell(decision.target_cell).ok_or_else(|| {
            tracing::error!(
                terminal = %decision.terminal,
                target = %decision.target_cell,
                decider = issued_by,
                "decision targets a cell outside the snapshot"
            );
            EngineError::InvariantViolation(format!(
                "{} selected for {} is not in the cell table",
                decision.target_cell, decision.terminal
            ))
        })?;
        Ok(HandoverCommand {
            command_id: self.ids.generate_command_id(),
            terminal: decision.terminal,
            rnti: decision.rnti,
            target_cell: target.cell_id,
            target_cell_node: target.node_id,
            issued_by: issued_by.to_string(),
            issued_at: self.clock.now(),
        })
    }
}

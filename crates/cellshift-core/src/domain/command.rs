//! Handover command handed back to the control-plane dispatcher.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{CellId, CellNodeId, CommandId, Rnti, TerminalNodeId};

/// Instruction to hand a terminal over to another cell.
///
/// The dispatcher needs the `(terminal, target_cell, target_cell_node)` triple;
/// `rnti` identifies the terminal inside its current cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandoverCommand {
    pub command_id: CommandId,
    pub terminal: TerminalNodeId,
    pub rnti: Rnti,
    pub target_cell: CellId,
    pub target_cell_node: CellNodeId,
    /// Name of the decider that produced the command.
    pub issued_by: String,
    pub issued_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ulid::Ulid;

    #[test]
    fn command_json_shape() {
        let cmd = HandoverCommand {
            command_id: CommandId::from_ulid(Ulid::nil()),
            terminal: TerminalNodeId::new(1),
            rnti: Rnti(9),
            target_cell: CellId(2),
            target_cell_node: CellNodeId::new(20),
            issued_by: "distance".to_string(),
            issued_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        };

        let v = serde_json::to_value(&cmd).unwrap();
        assert_eq!(v["terminal"], 1);
        assert_eq!(v["target_cell"], 2);
        assert_eq!(v["target_cell_node"], 20);
        assert_eq!(v["rnti"], 9);
        assert_eq!(v["issued_by"], "distance");
    }
}

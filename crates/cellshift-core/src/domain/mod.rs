//! Domain model (IDs, positions, records, snapshot, decisions, commands, errors).

pub mod command;
pub mod decision;
pub mod errors;
pub mod ids;
pub mod position;
pub mod record;
pub mod snapshot;

pub use self::command::HandoverCommand;
pub use self::decision::HandoverDecision;
pub use self::errors::{EngineError, ErrorKind, InferenceFailure};
pub use self::ids::{CellId, CellNodeId, CommandId, Rnti, RunId, TerminalNodeId};
pub use self::position::Position;
pub use self::record::{CellRecord, MetricKind, TerminalMetric, TerminalRecord};
pub use self::snapshot::Snapshot;

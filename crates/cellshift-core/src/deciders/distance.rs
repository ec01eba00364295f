//! Nearest-cell decider.
//!
//! Every terminal should be served by the geometrically closest cell. Equal
//! distances resolve to the lowest [`CellId`], so the same snapshot always
//! yields the same decisions regardless of repository enumeration order.

use std::cmp::Ordering;

use async_trait::async_trait;

use crate::domain::{
    CellRecord, EngineError, HandoverDecision, MetricKind, Position, Snapshot,
};
use crate::ports::Decider;

pub const DISTANCE_DECIDER_NAME: &str = "distance";

#[derive(Debug, Clone, Copy, Default)]
pub struct DistanceDecider;

impl DistanceDecider {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous core of [`Decider::decide`].
    ///
    /// Terminals without a position metric are ignored, so the result never
    /// holds more decisions than there are positioned terminals.
    pub fn decisions(&self, snapshot: &Snapshot) -> Vec<HandoverDecision> {
        let mut decisions = Vec::new();
        for terminal in snapshot.terminals() {
            let Some(position) = terminal.metric.position() else {
                continue;
            };
            let Some(nearest) = nearest_cell(position, snapshot.cells()) else {
                continue;
            };
            match HandoverDecision::between(terminal, nearest.cell_id) {
                Some(decision) => {
                    tracing::debug!(
                        terminal = %terminal.node_id,
                        serving = %terminal.serving_cell,
                        target = %nearest.cell_id,
                        "nearest cell differs from serving cell"
                    );
                    decisions.push(decision);
                }
                None => {
                    tracing::trace!(
                        terminal = %terminal.node_id,
                        cell = %terminal.serving_cell,
                        "already on nearest cell"
                    );
                }
            }
        }
        decisions
    }
}

/// The cell closest to `position`, lowest cell id among exact ties.
pub fn nearest_cell<'a>(position: &Position, cells: &'a [CellRecord]) -> Option<&'a CellRecord> {
    cells.iter().min_by(|a, b| {
        let da = position.distance_to(&a.position);
        let db = position.distance_to(&b.position);
        match da.total_cmp(&db) {
            Ordering::Equal => a.cell_id.cmp(&b.cell_id),
            other => other,
        }
    })
}

#[async_trait]
impl Decider for DistanceDecider {
    fn name(&self) -> &str {
        DISTANCE_DECIDER_NAME
    }

    fn required_metric(&self) -> MetricKind {
        MetricKind::Position
    }

    async fn decide(&self, snapshot: &Snapshot) -> Result<Vec<HandoverDecision>, EngineError> {
        Ok(self.decisions(snapshot))
    }
}

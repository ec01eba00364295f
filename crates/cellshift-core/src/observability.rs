//! Load report: what the loader left out of a snapshot and why.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Reason a terminal or cell was left out of the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Exclusion {
    NotFound,
    QueryFailed,
    MissingServingCell,
    MissingRnti,
    MissingMetric,
    InvalidMetric,
    MissingCellId,
    MissingPosition,
    InvalidPosition,
    Stale,
    DuplicateTerminal,
    DuplicateCellId,
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Exclusion::NotFound => "not found",
            Exclusion::QueryFailed => "query failed",
            Exclusion::MissingServingCell => "no serving cell",
            Exclusion::MissingRnti => "no rnti",
            Exclusion::MissingMetric => "required metric missing",
            Exclusion::InvalidMetric => "required metric not finite",
            Exclusion::MissingCellId => "no cell id",
            Exclusion::MissingPosition => "no position",
            Exclusion::InvalidPosition => "position not finite",
            Exclusion::Stale => "stale",
            Exclusion::DuplicateTerminal => "terminal listed more than once",
            Exclusion::DuplicateCellId => "duplicate cell id",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub terminals_listed: usize,
    pub terminals_loaded: usize,
    pub cells_listed: usize,
    pub cells_loaded: usize,
    pub terminals_excluded: BTreeMap<Exclusion, usize>,
    pub cells_excluded: BTreeMap<Exclusion, usize>,
}

impl LoadReport {
    pub fn exclude_terminal(&mut self, reason: Exclusion) {
        *self.terminals_excluded.entry(reason).or_default() += 1;
    }

    pub fn exclude_cell(&mut self, reason: Exclusion) {
        *self.cells_excluded.entry(reason).or_default() += 1;
    }

    pub fn terminals_excluded_for(&self, reason: Exclusion) -> usize {
        self.terminals_excluded.get(&reason).copied().unwrap_or(0)
    }

    pub fn cells_excluded_for(&self, reason: Exclusion) -> usize {
        self.cells_excluded.get(&reason).copied().unwrap_or(0)
    }

    pub fn total_excluded(&self) -> usize {
        self.terminals_excluded.values().sum::<usize>() + self.cells_excluded.values().sum::<usize>()
    }
}

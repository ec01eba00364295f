//! SnapshotLoader - repository から snapshot を構築
//!
//! # フロー
//! 1. `list_active_terminals()` / `list_cells()` で対象ノードを列挙
//! 2. ノードごとに最新状態を問い合わせ
//! 3. 必須フィールドが揃わない・古すぎる・重複したレコードは除外（エラーにはしない）
//!
//! 列挙自体が失敗した場合だけ invocation 全体が失敗します。

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::domain::{
    CellNodeId, CellRecord, EngineError, MetricKind, Snapshot, TerminalMetric, TerminalNodeId,
    TerminalRecord,
};
use crate::observability::{Exclusion, LoadReport};
use crate::ports::{CellState, Clock, DataRepository, RepositoryError, TerminalState};

pub struct SnapshotLoader {
    clock: Arc<dyn Clock>,
    max_record_age: Option<Duration>,
}

impl SnapshotLoader {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            max_record_age: None,
        }
    }

    /// `max_age` より古いレコードを除外する。`None` なら年齢を問わない
    pub fn with_max_record_age(mut self, max_age: Option<Duration>) -> Self {
        self.max_record_age = max_age;
        self
    }

    pub async fn load(
        &self,
        repo: &dyn DataRepository,
        metric: MetricKind,
    ) -> Result<(Snapshot, LoadReport), EngineError> {
        let now = self.clock.now();
        let mut report = LoadReport::default();

        let terminal_ids = repo.list_active_terminals().await?;
        report.terminals_listed = terminal_ids.len();
        let mut terminals = Vec::with_capacity(terminal_ids.len());
        let mut listed = HashSet::with_capacity(terminal_ids.len());
        for id in terminal_ids {
            let record = if !listed.insert(id) {
                Err(Exclusion::DuplicateTerminal)
            } else {
                match repo.terminal_state(id).await {
                    Ok(state) => self.terminal_record(id, &state, metric, now),
                    Err(e) => Err(query_exclusion(&e)),
                }
            };
            match record {
                Ok(record) => terminals.push(record),
                Err(reason) => {
                    tracing::debug!(terminal = %id, %reason, "terminal excluded from snapshot");
                    report.exclude_terminal(reason);
                }
            }
        }

        let cell_ids = repo.list_cells().await?;
        report.cells_listed = cell_ids.len();
        let mut cells: Vec<CellRecord> = Vec::with_capacity(cell_ids.len());
        let mut seen = HashSet::with_capacity(cell_ids.len());
        for id in cell_ids {
            let record = match repo.cell_state(id).await {
                Ok(state) => self.cell_record(id, &state, now),
                Err(e) => Err(query_exclusion(&e)),
            };
            let record = record.and_then(|cell| {
                if seen.insert(cell.cell_id) {
                    Ok(cell)
                } else {
                    Err(Exclusion::DuplicateCellId)
                }
            });
            match record {
                Ok(record) => cells.push(record),
                Err(reason) => {
                    tracing::debug!(cell = %id, %reason, "cell excluded from snapshot");
                    report.exclude_cell(reason);
                }
            }
        }

        report.terminals_loaded = terminals.len();
        report.cells_loaded = cells.len();
        Ok((Snapshot::new(terminals, cells), report))
    }

    fn terminal_record(
        &self,
        id: TerminalNodeId,
        state: &TerminalState,
        metric: MetricKind,
        now: DateTime<Utc>,
    ) -> Result<TerminalRecord, Exclusion> {
        if self.is_stale(state.observed_at, now) {
            return Err(Exclusion::Stale);
        }
        let serving_cell = state.serving_cell.ok_or(Exclusion::MissingServingCell)?;
        let rnti = state.rnti.ok_or(Exclusion::MissingRnti)?;
        let metric = match metric {
            MetricKind::Position => {
                let position = state.position.ok_or(Exclusion::MissingMetric)?;
                if !position.is_finite() {
                    return Err(Exclusion::InvalidMetric);
                }
                TerminalMetric::Position(position)
            }
            MetricKind::Loss => {
                let loss = state.loss_db.ok_or(Exclusion::MissingMetric)?;
                if !loss.is_finite() {
                    return Err(Exclusion::InvalidMetric);
                }
                TerminalMetric::Loss(loss)
            }
        };
        Ok(TerminalRecord {
            node_id: id,
            serving_cell,
            rnti,
            metric,
        })
    }

    fn cell_record(
        &self,
        id: CellNodeId,
        state: &CellState,
        now: DateTime<Utc>,
    ) -> Result<CellRecord, Exclusion> {
        if self.is_stale(state.observed_at, now) {
            return Err(Exclusion::Stale);
        }
        let cell_id = state.cell_id.ok_or(Exclusion::MissingCellId)?;
        let position = state.position.ok_or(Exclusion::MissingPosition)?;
        if !position.is_finite() {
            return Err(Exclusion::InvalidPosition);
        }
        Ok(CellRecord::new(id, cell_id, position))
    }

    fn is_stale(&self, observed_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let Some(max_age) = self.max_record_age else {
            return false;
        };
        // 負の経過時間（時計のずれ）は Err になり、新しいものとして扱う
        match now.signed_duration_since(observed_at).to_std() {
            Ok(age) => age > max_age,
            Err(_) => false,
        }
    }
}

fn query_exclusion(err: &RepositoryError) -> Exclusion {
    match err {
        RepositoryError::NotFound(_) => Exclusion::NotFound,
        RepositoryError::Unavailable(_) => Exclusion::QueryFailed,
    }
}

//! InMemoryRepository - 開発用・テスト用の data repository
//!
//! # 実装詳細
//! - 登録順（insertion order）で列挙する
//! - 状態のないノードも登録できる（`NotFound` の再現用）
//! - `set_available(false)` で列挙クエリを失敗させられる
//! - harness 用に `record_handover()` で serving cell を書き換えられる

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::domain::{CellId, CellNodeId, HandoverCommand, Position, Rnti, TerminalNodeId};
use crate::ports::{CellState, DataRepository, RepositoryError, TerminalState};

#[derive(Default)]
struct RepositoryState {
    terminals: Vec<(TerminalNodeId, Option<TerminalState>)>,
    cells: Vec<(CellNodeId, Option<CellState>)>,
}

fn upsert<K: PartialEq, V>(entries: &mut Vec<(K, Option<V>)>, key: K, value: Option<V>) {
    match entries.iter_mut().find(|(k, _)| *k == key) {
        Some((_, slot)) => {
            if value.is_some() {
                *slot = value;
            }
        }
        None => entries.push((key, value)),
    }
}

pub struct InMemoryRepository {
    state: RwLock<RepositoryState>,
    available: AtomicBool,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(RepositoryState::default()),
            available: AtomicBool::new(true),
        }
    }

    /// シナリオから repository を構築。タイムスタンプのないエントリには `now` を使う
    pub fn from_scenario(scenario: Scenario, now: DateTime<Utc>) -> Self {
        let mut state = RepositoryState::default();
        for t in scenario.terminals {
            let value = TerminalState {
                serving_cell: t.serving_cell,
                rnti: t.rnti,
                position: t.position,
                loss_db: t.loss_db,
                observed_at: t.observed_at.unwrap_or(now),
            };
            upsert(&mut state.terminals, t.node_id, Some(value));
        }
        for c in scenario.cells {
            let value = CellState {
                cell_id: c.cell_id,
                position: c.position,
                observed_at: c.observed_at.unwrap_or(now),
            };
            upsert(&mut state.cells, c.node_id, Some(value));
        }
        Self {
            state: RwLock::new(state),
            available: AtomicBool::new(true),
        }
    }

    /// 状態を持たない端末を列挙対象にだけ追加
    pub async fn register_terminal(&self, id: TerminalNodeId) {
        upsert(&mut self.state.write().await.terminals, id, None);
    }

    pub async fn upsert_terminal(&self, id: TerminalNodeId, state: TerminalState) {
        upsert(&mut self.state.write().await.terminals, id, Some(state));
    }

    pub async fn remove_terminal(&self, id: TerminalNodeId) {
        self.state.write().await.terminals.retain(|(k, _)| *k != id);
    }

    /// 状態を持たない cell を列挙対象にだけ追加
    pub async fn register_cell(&self, id: CellNodeId) {
        upsert(&mut self.state.write().await.cells, id, None);
    }

    pub async fn upsert_cell(&self, id: CellNodeId, state: CellState) {
        upsert(&mut self.state.write().await.cells, id, Some(state));
    }

    pub async fn remove_cell(&self, id: CellNodeId) {
        self.state.write().await.cells.retain(|(k, _)| *k != id);
    }

    /// harness 側の書き込み: 端末の serving cell を command の target に更新
    ///
    /// 端末の状態が記録されていなければ `false`
    pub async fn record_handover(&self, command: &HandoverCommand) -> bool {
        let mut state = self.state.write().await;
        let slot = state
            .terminals
            .iter_mut()
            .find(|(k, _)| *k == command.terminal)
            .and_then(|(_, s)| s.as_mut());
        match slot {
            Some(terminal) => {
                terminal.serving_cell = Some(command.target_cell);
                true
            }
            None => false,
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), RepositoryError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(RepositoryError::Unavailable("in-memory repository switched off".into()))
        }
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataRepository for InMemoryRepository {
    async fn list_active_terminals(&self) -> Result<Vec<TerminalNodeId>, RepositoryError> {
        self.check_available()?;
        Ok(self.state.read().await.terminals.iter().map(|(k, _)| *k).collect())
    }

    async fn list_cells(&self) -> Result<Vec<CellNodeId>, RepositoryError> {
        self.check_available()?;
        Ok(self.state.read().await.cells.iter().map(|(k, _)| *k).collect())
    }

    async fn terminal_state(&self, id: TerminalNodeId) -> Result<TerminalState, RepositoryError> {
        self.state
            .read()
            .await
            .terminals
            .iter()
            .find(|(k, _)| *k == id)
            .and_then(|(_, s)| s.clone())
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    async fn cell_state(&self, id: CellNodeId) -> Result<CellState, RepositoryError> {
        self.state
            .read()
            .await
            .cells
            .iter()
            .find(|(k, _)| *k == id)
            .and_then(|(_, s)| s.clone())
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }
}

/// [`InMemoryRepository`] の初期データになる JSON シナリオ
///
/// ```json
/// {
///   "terminals": [{ "node_id": 1, "serving_cell": 1, "rnti": 1,
///                   "position": { "x": 0.0, "y": 0.0, "z": 0.0 } }],
///   "cells": [{ "node_id": 10, "cell_id": 1,
///               "position": { "x": 100.0, "y": 0.0, "z": 0.0 } }]
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub terminals: Vec<ScenarioTerminal>,
    #[serde(default)]
    pub cells: Vec<ScenarioCell>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioTerminal {
    pub node_id: TerminalNodeId,
    #[serde(default)]
    pub serving_cell: Option<CellId>,
    #[serde(default)]
    pub rnti: Option<Rnti>,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub loss_db: Option<f64>,
    #[serde(default)]
    pub observed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioCell {
    pub node_id: CellNodeId,
    #[serde(default)]
    pub cell_id: Option<CellId>,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub observed_at: Option<DateTime<Utc>>,
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

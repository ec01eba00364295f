//! Impls - 実装（開発用・テスト用）
//!
//! このモジュールには ports の実装を含めます。
//!
//! # 含まれる実装
//! - **InMemoryRepository**: 開発用の data repository（scenario JSON から構築可能）
//! - **LinearModel / JsonModelLoader**: JSON 形式の線形スコアラー
//!
//! # 本番用実装
//! 本番の repository とモデルランタイムは RIC 側が提供します。

pub mod inmem_repository;
pub mod linear_model;

// 主要な型を再エクスポート
pub use self::inmem_repository::{InMemoryRepository, Scenario, ScenarioCell, ScenarioTerminal};
pub use self::linear_model::{JsonModelLoader, LinearModel};

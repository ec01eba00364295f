//! cellshift-core
//!
//! RAN コントローラ向けの handover 判断エンジン。repository から端末と cell の
//! 状態を読み、serving cell を変えるべき端末を判断して handover command を返します。
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, position, record, snapshot, decision, command, errors）
//! - **ports**: 抽象化レイヤー（DataRepository, Scorer, ModelLoader, Decider, Clock, IdGenerator）
//! - **deciders**: Decider の実装（distance, learned）と decode ルール
//! - **app**: アプリケーションロジック（builder, config, engine, loader, emitter）
//! - **impls**: 実装（InMemoryRepository, LinearModel など開発用）
//! - **observability**: LoadReport（snapshot から除外されたものの集計）

pub mod app;
pub mod deciders;
pub mod domain;
pub mod impls;
pub mod observability;
pub mod ports;

pub use app::{EngineBuilder, EngineConfig, HandoverEngine, RunOutput};
pub use domain::{EngineError, HandoverCommand, HandoverDecision};

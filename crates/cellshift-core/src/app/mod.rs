//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせて 1 回分の handover 判断を実装します。
//!
//! # 主要コンポーネント
//! - **EngineBuilder**: engine の構築とワイヤリング（fail-fast）
//! - **EngineConfig**: TOML 設定
//! - **HandoverEngine**: `run()` の入口
//! - **SnapshotLoader**: repository → snapshot
//! - **CommandEmitter**: decision → command

pub mod builder;
pub mod config;
pub mod emitter;
pub mod engine;
pub mod loader;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, EngineBuilder};
pub use self::config::{EngineConfig, StrategyKind};
pub use self::emitter::CommandEmitter;
pub use self::engine::{HandoverEngine, RunOutput};
pub use self::loader::SnapshotLoader;

//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait は外部システム（data repository, 学習済みモデル, 時計）への
//! インターフェースを提供し、実装の詳細を隠蔽します。
//!
//! # 設計原則
//! - repository は読み取り専用（記録は harness 側）
//! - モデルは `features -> scores` の不透明な関数

pub mod clock;
pub mod decider;
pub mod id_generator;
pub mod repository;
pub mod scorer;

// 主要な trait を再エクスポート
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::decider::Decider;
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::repository::{CellState, DataRepository, RepositoryError, TerminalState};
pub use self::scorer::{ModelLoader, ScoreError, Scorer};

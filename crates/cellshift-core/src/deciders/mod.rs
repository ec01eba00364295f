//! Deciders - `Decider` port の実装
//!
//! - **DistanceDecider**: 最も近い基地局へ
//! - **LearnedDecider**: 学習済みモデルの出力を decode して決める

pub mod decode;
pub mod distance;
pub mod learned;

pub use self::decode::{DecodeRule, Target};
pub use self::distance::{DISTANCE_DECIDER_NAME, DistanceDecider, nearest_cell};
pub use self::learned::{DEFAULT_INFERENCE_TIMEOUT, LEARNED_DECIDER_NAME, LearnedDecider};

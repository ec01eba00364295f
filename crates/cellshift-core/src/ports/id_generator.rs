//! IdGenerator port - ID 生成の抽象化
//!
//! # 実装
//! - **UlidGenerator**: Clock の時刻 + ランダム部分で ULID を生成

use std::sync::Arc;

use ulid::Ulid;

use crate::domain::ids::{CommandId, RunId};
use crate::ports::Clock;

/// IdGenerator は engine が払い出す ID を生成
pub trait IdGenerator: Send + Sync {
    fn generate_command_id(&self) -> CommandId;

    fn generate_run_id(&self) -> RunId;
}

/// ULID ベースの ID 生成器
///
/// timestamp 部分は Clock から取るので、FixedClock を使えばテストで
/// 時刻部分が固定されます（ランダム部分は毎回異なる）。
pub struct UlidGenerator {
    clock: Arc<dyn Clock>,
}

impl UlidGenerator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    fn next_ulid(&self) -> Ulid {
        let timestamp_ms = self.clock.now().timestamp_millis().max(0) as u64;
        Ulid::from_parts(timestamp_ms, rand::random())
    }
}

impl IdGenerator for UlidGenerator {
    fn generate_command_id(&self) -> CommandId {
        CommandId::from(self.next_ulid())
    }

    fn generate_run_id(&self) -> RunId {
        RunId::from(self.next_ulid())
    }
}

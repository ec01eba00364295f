//! ドメイン ID（型付き ID）
//!
//! # 二種類の ID
//! - **ノード ID** (`NodeId<T>`): repository が払い出す `u64`。端末と基地局で
//!   同じ数値空間を共有するため、Phantom type で型を分けています。
//! - **ULID ベースの ID** (`Id<T>`): engine 自身が生成する ID（command, run）。
//!   時刻でソート可能なので、ログの突き合わせに使えます。
//!
//! `CellId` と `Rnti` は無線スタック側の 16-bit 識別子です。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

/// IdMarker は各 ID 型のマーカー trait
///
/// Display で使うプレフィックス（"cmd-", "run-", "terminal-" など）を提供します。
pub trait IdMarker: Send + Sync + 'static {
    fn prefix() -> &'static str;
}

/// engine が生成する ULID ベースの ID
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<T: IdMarker> {
    ulid: Ulid,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self {
            ulid,
            _marker: PhantomData,
        }
    }

    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }
}

impl<T: IdMarker> From<Ulid> for Id<T> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.ulid)
    }
}

/// repository が払い出すノード ID
///
/// `T` はコンパイル時だけの型。同じ `u64` でも `CellNodeId` の位置に
/// `TerminalNodeId` は渡せません。
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId<T: IdMarker> {
    value: u64,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> NodeId<T> {
    pub const fn new(value: u64) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    pub fn get(&self) -> u64 {
        self.value
    }
}

impl<T: IdMarker> fmt::Display for NodeId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.value)
    }
}

// ========================================
// マーカー型の定義
// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Command {}

impl IdMarker for Command {
    fn prefix() -> &'static str {
        "cmd-"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Run {}

impl IdMarker for Run {
    fn prefix() -> &'static str {
        "run-"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Terminal {}

impl IdMarker for Terminal {
    fn prefix() -> &'static str {
        "terminal-"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CellNode {}

impl IdMarker for CellNode {
    fn prefix() -> &'static str {
        "cell-node-"
    }
}

// ========================================
// Type Alias（使いやすさのため）
// ========================================

/// 発行した handover command の ID
pub type CommandId = Id<Command>;

/// engine の 1 回の invocation の ID
pub type RunId = Id<Run>;

/// 端末（UE）のノード ID
pub type TerminalNodeId = NodeId<Terminal>;

/// 基地局（eNB）のノード ID
pub type CellNodeId = NodeId<CellNode>;

/// 無線スタック側の cell ID。snapshot 内で一意
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellId(pub u16);

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cell-{}", self.0)
    }
}

/// serving cell 内での端末の一時識別子（RNTI）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rnti(pub u16);

impl fmt::Display for Rnti {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rnti-{}", self.0)
    }
}

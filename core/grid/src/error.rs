//! 錯誤處理系統
//!
//! 只有初始化尺寸錯誤與存檔錯誤會走 `Result`；
//! 找不到路徑、佔據衝突、越界查詢都以回傳值表達。

use crate::alias::{Coord, UnitId};
use crate::core_types::Position;
use thiserror::Error as ThisError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// 頂層錯誤，包含原始錯誤和 context 鏈
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    contexts: Vec<String>,
}

/// 錯誤種類
#[derive(Debug, ThisError)]
pub enum ErrorKind {
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Occupancy(#[from] OccupancyError),
    #[error(transparent)]
    Load(#[from] LoadError),
}

/// 棋盤錯誤
#[derive(Debug, ThisError)]
pub enum GridError {
    #[error("棋盤尺寸無效: 寬 {width}, 高 {height}, 格子大小 {cell_size}")]
    InvalidDimension {
        width: Coord,
        height: Coord,
        cell_size: f32,
    },
    #[error("位置超出棋盤邊界: ({x}, {z}) 邊界 ({width}, {height})")]
    OutOfBounds {
        x: Coord,
        z: Coord,
        width: Coord,
        height: Coord,
    },
}

/// 佔據錯誤
#[derive(Debug, ThisError)]
pub enum OccupancyError {
    #[error("位置 {pos:?} 已被 {existing} 佔據")]
    PositionTaken { pos: Position, existing: UnitId },
    #[error("佔據者 {occupant} 已存在於位置 {pos:?}，無法重複插入")]
    OccupantAlreadyPlaced { occupant: UnitId, pos: Position },
    #[error("佔據者 {occupant} 不在 {pos:?}")]
    OccupantNotAt { occupant: UnitId, pos: Position },
}

/// 存檔載入錯誤
#[derive(Debug, ThisError)]
pub enum LoadError {
    #[error("檔案讀寫失敗 {path}: {reason}")]
    Io { path: String, reason: String },
    #[error("解析失敗: {0}")]
    ParseError(String),
    #[error("{format} 反序列化失敗: {reason}")]
    DeserializeError { format: String, reason: String },
    #[error("{format} 序列化失敗: {reason}")]
    SerializeError { format: String, reason: String },
    #[error("不支援的存檔版本: {found}（目前 {supported}）")]
    UnsupportedVersion { found: u32, supported: u32 },
    #[error("存檔內容無效: {0}")]
    InvalidRecord(String),
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// 添加錯誤上下文，自動記錄呼叫位置
    #[track_caller]
    pub fn context<C: Into<String>>(mut self, context: C) -> Self {
        let loc = std::panic::Location::caller();
        let msg = format!("{} [{}:{}]", context.into(), loc.file(), loc.line());
        self.contexts.push(msg);
        self
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)?;
        for ctx in &self.contexts {
            write!(f, "\n  {}", ctx)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

impl<E: Into<ErrorKind>> From<E> for Error {
    fn from(error: E) -> Self {
        Self {
            kind: error.into(),
            contexts: Vec::new(),
        }
    }
}

/// Result 擴展 trait，用於添加錯誤上下文
pub trait Context<T> {
    fn context<C: Into<String>>(self, context: C) -> Result<T>;
}

impl<T> Context<T> for Result<T> {
    #[track_caller]
    fn context<C: Into<String>>(self, context: C) -> Result<T> {
        let loc = std::panic::Location::caller();
        self.map_err(|e| {
            let msg = format!("{} [{}:{}]", context.into(), loc.file(), loc.line());
            let mut e = e;
            e.contexts.push(msg);
            e
        })
    }
}

//! 棋盤常數定義

use crate::alias::MovementCost;

/// 基礎移動成本
pub const DEFAULT_MOVEMENT_COST: MovementCost = 1.0;

/// 無法通過的移動成本（牆壁、障礙物）
pub const IMPASSABLE_MOVEMENT_COST: MovementCost = MovementCost::INFINITY;

/// 存檔格式版本
pub const SAVE_FORMAT_VERSION: u32 = 1;

/// 路徑快取預設容量
pub const DEFAULT_PATH_CACHE_CAPACITY: usize = 1024;

/// 單一棋盤的格子數上限（含存檔宣告的尺寸）
pub const MAX_TILE_COUNT: usize = 1 << 24;

//! 型別別名

/// 格子座標軸數值（有號，世界座標轉換可能得到負值）
pub type Coord = i32;

/// 進入格子的移動成本
pub type MovementCost = f32;

/// 格子高度（僅影響世界座標）
pub type Elevation = f32;

/// 佔據者識別碼
pub type UnitId = u64;

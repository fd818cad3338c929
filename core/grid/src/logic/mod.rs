//! 核心棋盤邏輯（與呈現無關）

pub mod coordinate;
pub mod occupancy;
pub mod path_cache;
pub mod pathfinding;
pub mod tile_grid;

//! 戰棋棋盤與路徑搜尋核心
//!
//! 與呈現層無關的空間推理函式庫：
//! - 密集格子資料（地形、移動成本、可行走、佔據、高度、掩體）
//! - 格子與世界座標轉換
//! - A* 路徑、移動範圍、路徑快取
//! - 佔據者索引
//! - 存檔與載入
//!
//! 外部只需使用 [`GridFacade`]。

pub mod alias;
pub mod config;
pub mod constants;
pub mod core_types;
pub mod error;
pub mod facade;
pub mod loader;
pub mod logic;
pub mod serialization;

pub use alias::{Coord, Elevation, MovementCost, UnitId};
pub use config::{GridConfig, TerrainCost};
pub use core_types::{CoverType, Direction, Path, Position, TerrainType, Tile};
pub use error::{Error, ErrorKind, Result};
pub use facade::{GridFacade, GridObserver};
pub use loader::load_from_ascii;
pub use serialization::{GridRecord, TileRecord};

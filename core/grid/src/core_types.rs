//! 基本資料類型定義

use crate::alias::{Coord, Elevation, MovementCost};
use crate::constants::{DEFAULT_MOVEMENT_COST, IMPASSABLE_MOVEMENT_COST};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, FromRepr};

// ============================================================================
// 座標與方向
// ============================================================================

/// 棋盤位置（座標）
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    pub x: Coord,
    pub z: Coord,
}

impl Position {
    pub const fn new(x: Coord, z: Coord) -> Self {
        Self { x, z }
    }

    /// 曼哈頓距離
    pub fn manhattan_distance(self, other: Position) -> Coord {
        (self.x - other.x).abs() + (self.z - other.z).abs()
    }

    /// 往指定方向走一格（不檢查邊界）
    pub fn step(self, direction: Direction) -> Position {
        let (dx, dz) = direction.offset();
        Position {
            x: self.x + dx,
            z: self.z + dz,
        }
    }

    /// 四方向鄰居，順序固定為東、北、西、南
    pub fn neighbors(self) -> impl Iterator<Item = Position> {
        Direction::iter().map(move |d| self.step(d))
    }

    /// 是否與另一位置四方向相鄰
    pub fn is_adjacent(self, other: Position) -> bool {
        self.manhattan_distance(other) == 1
    }
}

/// 移動方向（四方向）
///
/// 宣告順序即鄰居列舉順序，A* 同分時依此順序展開
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Direction {
    East,
    North,
    West,
    South,
}

impl Direction {
    /// (dx, dz)
    pub fn offset(self) -> (Coord, Coord) {
        match self {
            Direction::East => (1, 0),
            Direction::North => (0, 1),
            Direction::West => (-1, 0),
            Direction::South => (0, -1),
        }
    }
}

/// 路徑：起點到終點（含兩端），每步四方向相鄰
pub type Path = Vec<Position>;

// ============================================================================
// 地形與掩體
// ============================================================================

/// 地形種類，存檔時以整數表示
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    FromRepr,
)]
#[repr(u8)]
pub enum TerrainType {
    #[default]
    Ground = 0,
    Water,
    Mud,
    Sand,
    Road,
    Rocks,
    Metal,
    Grass,
    Snow,
    Ice,
    Lava,
    Wall,
    Obstacle,
}

impl TerrainType {
    /// 牆壁與障礙物無論成本與可行走旗標都不可通行
    pub fn is_blocking(self) -> bool {
        matches!(self, TerrainType::Wall | TerrainType::Obstacle)
    }

    /// 預設移動成本（皆 >= 1，曼哈頓啟發值保持可採納）
    pub fn default_movement_cost(self) -> MovementCost {
        match self {
            TerrainType::Ground
            | TerrainType::Road
            | TerrainType::Metal
            | TerrainType::Grass
            | TerrainType::Ice => DEFAULT_MOVEMENT_COST,
            TerrainType::Sand | TerrainType::Snow => 1.5,
            TerrainType::Mud | TerrainType::Rocks => 2.0,
            TerrainType::Water => 3.0,
            TerrainType::Lava => 5.0,
            TerrainType::Wall | TerrainType::Obstacle => IMPASSABLE_MOVEMENT_COST,
        }
    }
}

/// 掩體種類，僅儲存，由戰鬥邏輯解讀
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    FromRepr,
)]
#[repr(u8)]
pub enum CoverType {
    #[default]
    None = 0,
    Half,
    Full,
    Destructible,
}

// ============================================================================
// 格子
// ============================================================================

/// 棋盤上的一格
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub position: Position,
    pub terrain: TerrainType,
    pub movement_cost: MovementCost,
    pub is_walkable: bool,
    pub is_occupied: bool,
    pub elevation: Elevation,
    pub cover: CoverType,
}

impl Tile {
    /// 預設格子：平地、成本 1、可行走、無佔據、高度 0、無掩體
    pub fn new(position: Position) -> Self {
        Self {
            position,
            terrain: TerrainType::Ground,
            movement_cost: DEFAULT_MOVEMENT_COST,
            is_walkable: true,
            is_occupied: false,
            elevation: 0.0,
            cover: CoverType::None,
        }
    }

    /// 地形與可行走旗標是否允許進入（不處理佔據）
    pub fn is_passable(&self) -> bool {
        self.is_walkable && !self.terrain.is_blocking()
    }
}

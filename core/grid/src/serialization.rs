//! 棋盤存檔
//!
//! 扁平紀錄：尺寸、格子大小、原點，以及每格一筆 `TileRecord`。
//! 地形與掩體以整數儲存。載入時先完整驗證並建出新的棋盤，
//! 驗證失敗不會動到目前的棋盤。

use crate::alias::{Coord, Elevation, MovementCost, UnitId};
use crate::constants::SAVE_FORMAT_VERSION;
use crate::core_types::{CoverType, Position, TerrainType, Tile};
use crate::error::{Context, LoadError, Result};
use crate::logic::occupancy::OccupancyTracker;
use crate::logic::tile_grid::TileGrid;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 單格紀錄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileRecord {
    pub x: Coord,
    pub z: Coord,
    pub terrain: u8,
    pub movement_cost: MovementCost,
    pub walkable: bool,
    pub occupied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupant: Option<UnitId>,
    pub elevation: Elevation,
    pub cover: u8,
}

/// 整個棋盤的紀錄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridRecord {
    pub version: u32,
    pub width: Coord,
    pub height: Coord,
    pub cell_size: f32,
    pub origin: [f32; 3],
    pub tiles: Vec<TileRecord>,
}

impl GridRecord {
    /// 由目前棋盤狀態建立紀錄
    pub fn capture(grid: &TileGrid, occupancy: &OccupancyTracker) -> Self {
        let tiles = grid
            .tiles()
            .map(|tile| TileRecord {
                x: tile.position.x,
                z: tile.position.z,
                terrain: tile.terrain as u8,
                movement_cost: tile.movement_cost,
                walkable: tile.is_walkable,
                occupied: tile.is_occupied,
                occupant: occupancy.occupant_at(tile.position),
                elevation: tile.elevation,
                cover: tile.cover as u8,
            })
            .collect();

        Self {
            version: SAVE_FORMAT_VERSION,
            width: grid.width(),
            height: grid.height(),
            cell_size: grid.cell_size(),
            origin: grid.origin().to_array(),
            tiles,
        }
    }

    /// 驗證紀錄並建出新的棋盤與佔據索引
    ///
    /// 先以預設值初始化，再套用紀錄；紀錄未涵蓋的格子維持預設值。
    pub fn restore(&self) -> Result<(TileGrid, OccupancyTracker)> {
        if self.version != SAVE_FORMAT_VERSION {
            return Err(LoadError::UnsupportedVersion {
                found: self.version,
                supported: SAVE_FORMAT_VERSION,
            }
            .into());
        }

        let mut grid = TileGrid::new(
            self.width,
            self.height,
            self.cell_size,
            Vec3::from_array(self.origin),
        )
        .context("還原棋盤尺寸")?;
        let mut occupancy = OccupancyTracker::default();

        if self.tiles.len() > grid.tile_count() {
            return Err(invalid(format!(
                "格子數 {} 超過棋盤大小 {}",
                self.tiles.len(),
                grid.tile_count()
            )));
        }

        let mut seen = HashSet::new();
        for record in &self.tiles {
            let tile = record
                .to_tile()
                .context(format!("還原格子 ({}, {})", record.x, record.z))?;
            let pos = tile.position;
            if !grid.is_valid_position(pos) {
                return Err(invalid(format!("格子 {pos:?} 超出棋盤")));
            }
            if !seen.insert(pos) {
                return Err(invalid(format!("格子 {pos:?} 重複")));
            }
            if let Some(occupant) = record.occupant {
                occupancy
                    .set_occupant(pos, occupant)
                    .map_err(|e| invalid(e.to_string()))?;
            }
            grid.replace_tile(tile);
        }

        Ok((grid, occupancy))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| {
            LoadError::SerializeError {
                format: "toml".to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| {
            LoadError::DeserializeError {
                format: "toml".to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    pub fn write_file(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let path = path.as_ref();
        let content = self.to_toml_string()?;
        std::fs::write(path, content).map_err(|e| {
            LoadError::Io {
                path: path.display().to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    pub fn read_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| LoadError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&content).context(format!("讀取存檔 {}", path.display()))
    }
}

impl TileRecord {
    fn to_tile(&self) -> Result<Tile> {
        let position = Position {
            x: self.x,
            z: self.z,
        };
        let terrain = TerrainType::from_repr(self.terrain)
            .ok_or_else(|| invalid(format!("地形代碼 {} 無效", self.terrain)))?;
        let cover = CoverType::from_repr(self.cover)
            .ok_or_else(|| invalid(format!("掩體代碼 {} 無效", self.cover)))?;
        if !(self.movement_cost > 0.0) {
            return Err(invalid(format!("移動成本 {} 必須為正數", self.movement_cost)));
        }
        if self.occupied != self.occupant.is_some() {
            return Err(invalid("佔據旗標與佔據者不一致".to_string()));
        }

        Ok(Tile {
            position,
            terrain,
            movement_cost: self.movement_cost,
            is_walkable: self.walkable,
            is_occupied: self.occupied,
            elevation: self.elevation,
            cover,
        })
    }
}

fn invalid(reason: String) -> crate::error::Error {
    LoadError::InvalidRecord(reason).into()
}

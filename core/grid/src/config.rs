//! 棋盤設定
//!
//! 以 TOML 描述棋盤尺寸、原點、路徑快取容量與地形成本覆寫。

use crate::alias::{Coord, MovementCost};
use crate::constants::DEFAULT_PATH_CACHE_CAPACITY;
use crate::core_types::TerrainType;
use crate::error::{GridError, LoadError, Result};
use crate::logic::tile_grid::checked_tile_count;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// 單一地形的移動成本覆寫
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerrainCost {
    pub terrain: TerrainType,
    pub cost: MovementCost,
}

/// 棋盤設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub width: Coord,
    pub height: Coord,
    pub cell_size: f32,
    pub origin: [f32; 3],
    pub path_cache_capacity: usize,
    pub terrain_costs: Vec<TerrainCost>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 10,
            height: 10,
            cell_size: 1.0,
            origin: [0.0; 3],
            path_cache_capacity: DEFAULT_PATH_CACHE_CAPACITY,
            terrain_costs: Vec::new(),
        }
    }
}

impl GridConfig {
    /// 指定尺寸，其他欄位取預設值
    pub fn with_dimensions(width: Coord, height: Coord, cell_size: f32, origin: Vec3) -> Self {
        Self {
            width,
            height,
            cell_size,
            origin: origin.to_array(),
            ..Self::default()
        }
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: GridConfig =
            toml::from_str(toml_str).map_err(|e| LoadError::DeserializeError {
                format: "toml".to_string(),
                reason: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| LoadError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&content)
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

    pub fn origin(&self) -> Vec3 {
        Vec3::from_array(self.origin)
    }

    /// 檢查尺寸與成本覆寫
    pub fn validate(&self) -> Result<()> {
        if checked_tile_count(self.width, self.height, self.cell_size).is_none() {
            return Err(GridError::InvalidDimension {
                width: self.width,
                height: self.height,
                cell_size: self.cell_size,
            }
            .into());
        }
        if let Some(bad) = self
            .terrain_costs
            .iter()
            .find(|c| !(c.cost > 0.0) || c.terrain.is_blocking())
        {
            return Err(LoadError::InvalidRecord(format!(
                "地形成本覆寫無效: {} = {}",
                bad.terrain, bad.cost
            ))
            .into());
        }
        Ok(())
    }

    /// 地形移動成本：設定覆寫優先，否則取地形預設值
    pub fn movement_cost(&self, terrain: TerrainType) -> MovementCost {
        self.terrain_costs
            .iter()
            .rev()
            .find(|c| c.terrain == terrain)
            .map_or_else(|| terrain.default_movement_cost(), |c| c.cost)
    }
}

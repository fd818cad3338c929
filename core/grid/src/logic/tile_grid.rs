//! 棋盤格子資料
//!
//! 密集的列優先陣列（`index = z * width + x`），每個界內位置恰有一格。
//! 越界的修改一律靜默忽略：編輯關卡時偶爾點到界外是預期中的事。

use crate::alias::{Coord, Elevation, MovementCost};
use crate::constants::MAX_TILE_COUNT;
use crate::core_types::{CoverType, Position, TerrainType, Tile};
use crate::error::{GridError, Result};
use glam::Vec3;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct TileGrid {
    width: Coord,
    height: Coord,
    cell_size: f32,
    origin: Vec3,
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// 配置格子並全部重設為預設值
    ///
    /// 寬、高、格子大小非正值，或格子數超過 `MAX_TILE_COUNT` 時
    /// 回傳 `InvalidDimension`
    pub fn new(width: Coord, height: Coord, cell_size: f32, origin: Vec3) -> Result<Self> {
        let Some(count) = checked_tile_count(width, height, cell_size) else {
            return Err(GridError::InvalidDimension {
                width,
                height,
                cell_size,
            }
            .into());
        };

        let mut tiles = Vec::with_capacity(count);
        for z in 0..height {
            for x in 0..width {
                tiles.push(Tile::new(Position { x, z }));
            }
        }

        Ok(Self {
            width,
            height,
            cell_size,
            origin,
            tiles,
        })
    }

    pub fn width(&self) -> Coord {
        self.width
    }

    pub fn height(&self) -> Coord {
        self.height
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// 驗證位置是否在棋盤邊界內
    pub fn is_valid_position(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.z >= 0 && pos.x < self.width && pos.z < self.height
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if !self.is_valid_position(pos) {
            return None;
        }
        Some(pos.z as usize * self.width as usize + pos.x as usize)
    }

    pub fn tile(&self, pos: Position) -> Option<&Tile> {
        self.index(pos).map(|i| &self.tiles[i])
    }

    fn tile_mut(&mut self, pos: Position) -> Option<&mut Tile> {
        self.index(pos).map(move |i| &mut self.tiles[i])
    }

    /// 所有格子，列優先順序
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    /// 設定地形與成本，回傳是否生效
    ///
    /// 成本必須為正數；牆壁與障礙物的成本不影響通行判定
    pub fn set_terrain(
        &mut self,
        pos: Position,
        terrain: TerrainType,
        movement_cost: MovementCost,
    ) -> bool {
        if !(movement_cost > 0.0) {
            warn!(?pos, %terrain, movement_cost, "拒絕非正數的移動成本");
            return false;
        }
        match self.tile_mut(pos) {
            Some(tile) => {
                tile.terrain = terrain;
                tile.movement_cost = movement_cost;
                true
            }
            None => false,
        }
    }

    pub fn set_walkable(&mut self, pos: Position, walkable: bool) -> bool {
        match self.tile_mut(pos) {
            Some(tile) => {
                tile.is_walkable = walkable;
                true
            }
            None => false,
        }
    }

    pub fn set_elevation(&mut self, pos: Position, elevation: Elevation) -> bool {
        match self.tile_mut(pos) {
            Some(tile) => {
                tile.elevation = elevation;
                true
            }
            None => false,
        }
    }

    pub fn set_cover(&mut self, pos: Position, cover: CoverType) -> bool {
        match self.tile_mut(pos) {
            Some(tile) => {
                tile.cover = cover;
                true
            }
            None => false,
        }
    }

    // 佔據旗標只能由 GridFacade 與 OccupancyTracker 同步修改
    pub(crate) fn set_occupied_flag(&mut self, pos: Position, occupied: bool) -> bool {
        match self.tile_mut(pos) {
            Some(tile) => {
                tile.is_occupied = occupied;
                true
            }
            None => false,
        }
    }

    // 載入存檔時整格覆寫（位置由呼叫端保證一致）
    pub(crate) fn replace_tile(&mut self, tile: Tile) -> bool {
        match self.tile_mut(tile.position) {
            Some(slot) => {
                *slot = tile;
                true
            }
            None => false,
        }
    }

    /// 界內、可通行的四方向鄰居（不處理佔據）
    pub fn passable_neighbors(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        pos.neighbors()
            .filter(move |n| self.tile(*n).is_some_and(Tile::is_passable))
    }
}

/// 尺寸有效時的格子數
pub fn checked_tile_count(width: Coord, height: Coord, cell_size: f32) -> Option<usize> {
    if width <= 0 || height <= 0 || !(cell_size > 0.0) || !cell_size.is_finite() {
        return None;
    }
    let count = usize::try_from(width)
        .ok()?
        .checked_mul(usize::try_from(height).ok()?)?;
    (count <= MAX_TILE_COUNT).then_some(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(width: Coord, height: Coord) -> TileGrid {
        TileGrid::new(width, height, 1.0, Vec3::ZERO).unwrap()
    }

    #[test]
    fn test_new_resets_defaults() {
        let grid = grid(4, 3);
        assert_eq!(grid.tile_count(), 12);
        for z in 0..3 {
            for x in 0..4 {
                let pos = Position { x, z };
                assert_eq!(grid.tile(pos), Some(&Tile::new(pos)));
            }
        }
    }

    #[test]
    fn test_new_invalid_dimension() {
        let test_data = [
            (0, 5, 1.0),
            (5, 0, 1.0),
            (-1, 5, 1.0),
            (5, 5, 0.0),
            (5, 5, -2.0),
            (5, 5, f32::NAN),
            (5, 5, f32::INFINITY),
            (2_000_000_000, 2_000_000_000, 1.0),
            (Coord::MAX, 1, 1.0),
            (4097, 4096, 1.0),
        ];
        for (idx, (w, h, cs)) in test_data.into_iter().enumerate() {
            assert!(TileGrid::new(w, h, cs, Vec3::ZERO).is_err(), "Case {}", idx);
        }
    }

    #[test]
    fn test_is_valid_position() {
        let grid = grid(3, 2);
        assert!(grid.is_valid_position(Position::new(0, 0)));
        assert!(grid.is_valid_position(Position::new(2, 1)));
        assert!(!grid.is_valid_position(Position::new(3, 0)));
        assert!(!grid.is_valid_position(Position::new(0, 2)));
        assert!(!grid.is_valid_position(Position::new(-1, 0)));
        assert!(!grid.is_valid_position(Position::new(0, -1)));
        assert!(grid.tile(Position::new(-1, 0)).is_none());
    }

    #[test]
    fn test_out_of_bounds_edits_are_ignored() {
        let mut grid = grid(2, 2);
        let before: Vec<Tile> = grid.tiles().cloned().collect();
        let outside = Position::new(2, 0);
        assert!(!grid.set_terrain(outside, TerrainType::Mud, 2.0));
        assert!(!grid.set_walkable(outside, false));
        assert!(!grid.set_elevation(outside, 3.0));
        assert!(!grid.set_cover(outside, CoverType::Full));
        let after: Vec<Tile> = grid.tiles().cloned().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_set_terrain_rejects_non_positive_cost() {
        let mut grid = grid(2, 2);
        let pos = Position::new(1, 1);
        assert!(!grid.set_terrain(pos, TerrainType::Mud, 0.0));
        assert!(!grid.set_terrain(pos, TerrainType::Mud, f32::NAN));
        assert_eq!(grid.tile(pos).unwrap().terrain, TerrainType::Ground);
        assert!(grid.set_terrain(pos, TerrainType::Mud, 2.0));
        let tile = grid.tile(pos).unwrap();
        assert_eq!(tile.terrain, TerrainType::Mud);
        assert_eq!(tile.movement_cost, 2.0);
    }

    #[test]
    fn test_passable_neighbors() {
        let mut grid = grid(3, 3);
        grid.set_terrain(Position::new(2, 1), TerrainType::Wall, 1.0);
        grid.set_walkable(Position::new(1, 2), false);
        let neighbors: Vec<Position> = grid.passable_neighbors(Position::new(1, 1)).collect();
        assert_eq!(neighbors, vec![Position::new(0, 1), Position::new(1, 0)]);

        let corner: Vec<Position> = grid.passable_neighbors(Position::new(0, 0)).collect();
        assert_eq!(corner, vec![Position::new(1, 0), Position::new(0, 1)]);
    }
}

//! 棋盤服務的單一入口
//!
//! 戰鬥、UI、單位移動只依賴 `GridFacade`，不直接碰內部服務。
//! 由上層組裝一次後以參考傳遞，內部服務在建構時依相依順序組好。
//!
//! 佔據旗標（`Tile::is_occupied`）與 `OccupancyTracker` 只在這裡一起修改，
//! 兩者永遠一致；每次佔據變化都會整批清空路徑快取。

use crate::alias::{Coord, Elevation, MovementCost, UnitId};
use crate::config::GridConfig;
use crate::core_types::{CoverType, Path, Position, TerrainType, Tile};
use crate::error::{Context, Result};
use crate::logic::coordinate::CoordinateMapper;
use crate::logic::occupancy::OccupancyTracker;
use crate::logic::path_cache::{CacheStats, PathCache, PathKey};
use crate::logic::pathfinding::{self, GridView, ReachableInfo};
use crate::logic::tile_grid::TileGrid;
use crate::serialization::GridRecord;
use glam::Vec3;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// 棋盤變化通知，由單位移動或呈現層實作後註冊
///
/// 所有方法都有空的預設實作，只需覆寫關心的事件
pub trait GridObserver {
    /// 佔據者移動成功
    fn on_occupant_moved(&mut self, _occupant: UnitId, _from: Position, _to: Position) {}

    /// 某位置的佔據者被設定或清除（`None` 表示清除）
    fn on_occupancy_changed(&mut self, _pos: Position, _occupant: Option<UnitId>) {}

    /// 棋盤被重新初始化或從存檔載入
    fn on_grid_reloaded(&mut self, _width: Coord, _height: Coord) {}
}

pub struct GridFacade {
    config: GridConfig,
    grid: TileGrid,
    mapper: CoordinateMapper,
    occupancy: OccupancyTracker,
    cache: PathCache,
    observers: Vec<Box<dyn GridObserver>>,
}

impl std::fmt::Debug for GridFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridFacade")
            .field("width", &self.grid.width())
            .field("height", &self.grid.height())
            .field("occupants", &self.occupancy.len())
            .field("cached_paths", &self.cache.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl GridFacade {
    /// 依設定建立棋盤
    pub fn new(config: GridConfig) -> Result<Self> {
        config.validate().context("建立棋盤")?;
        let grid = TileGrid::new(
            config.width,
            config.height,
            config.cell_size,
            config.origin(),
        )?;
        info!(
            width = config.width,
            height = config.height,
            cell_size = config.cell_size,
            "棋盤初始化"
        );
        Ok(Self {
            mapper: mapper_for(&grid),
            cache: PathCache::with_capacity(config.path_cache_capacity),
            occupancy: OccupancyTracker::default(),
            observers: Vec::new(),
            config,
            grid,
        })
    }

    /// 以預設設定與指定尺寸建立棋盤
    pub fn initialize(width: Coord, height: Coord, cell_size: f32, origin: Vec3) -> Result<Self> {
        Self::new(GridConfig::with_dimensions(width, height, cell_size, origin))
    }

    /// 重新初始化（尺寸變更只能走這裡），清除所有格子與佔據者
    ///
    /// 尺寸無效時保留原本的棋盤
    pub fn reinitialize(
        &mut self,
        width: Coord,
        height: Coord,
        cell_size: f32,
        origin: Vec3,
    ) -> Result<()> {
        let grid = TileGrid::new(width, height, cell_size, origin).context("重新初始化棋盤")?;
        self.config.width = width;
        self.config.height = height;
        self.config.cell_size = cell_size;
        self.config.origin = origin.to_array();
        self.replace_state(grid, OccupancyTracker::default());
        info!(width, height, cell_size, "棋盤重新初始化");
        Ok(())
    }

    fn replace_state(&mut self, grid: TileGrid, occupancy: OccupancyTracker) {
        self.mapper = mapper_for(&grid);
        self.grid = grid;
        self.occupancy = occupancy;
        self.cache.invalidate_all();
        let (width, height) = (self.grid.width(), self.grid.height());
        for observer in &mut self.observers {
            observer.on_grid_reloaded(width, height);
        }
    }

    pub fn add_observer(&mut self, observer: Box<dyn GridObserver>) {
        self.observers.push(observer);
    }

    // ========================================================================
    // 尺寸與座標
    // ========================================================================

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn tile_grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn width(&self) -> Coord {
        self.grid.width()
    }

    pub fn height(&self) -> Coord {
        self.grid.height()
    }

    pub fn cell_size(&self) -> f32 {
        self.grid.cell_size()
    }

    pub fn origin(&self) -> Vec3 {
        self.grid.origin()
    }

    pub fn is_valid_position(&self, pos: Position) -> bool {
        self.grid.is_valid_position(pos)
    }

    /// 格子中心的世界座標（含格子高度；界外以高度 0 計算）
    pub fn grid_to_world(&self, pos: Position) -> Vec3 {
        let elevation = self.grid.tile(pos).map_or(0.0, |t| t.elevation);
        self.mapper.grid_to_world(pos, elevation)
    }

    pub fn world_to_grid(&self, point: Vec3) -> (Position, bool) {
        self.mapper.world_to_grid(point)
    }

    pub fn world_to_grid_checked(&self, point: Vec3) -> Option<Position> {
        self.mapper.world_to_grid_checked(point)
    }

    // ========================================================================
    // 地形
    // ========================================================================

    pub fn tile(&self, pos: Position) -> Option<&Tile> {
        self.grid.tile(pos)
    }

    pub fn terrain_type(&self, pos: Position) -> Option<TerrainType> {
        self.grid.tile(pos).map(|t| t.terrain)
    }

    /// 設定地形，成本取設定中的地形成本
    pub fn set_terrain_type(&mut self, pos: Position, terrain: TerrainType) -> bool {
        let cost = self.config.movement_cost(terrain);
        self.set_terrain(pos, terrain, cost)
    }

    /// 設定地形與指定成本；越界或成本非正數時不做任何事
    pub fn set_terrain(
        &mut self,
        pos: Position,
        terrain: TerrainType,
        movement_cost: MovementCost,
    ) -> bool {
        let applied = self.grid.set_terrain(pos, terrain, movement_cost);
        if applied {
            self.cache.invalidate_all();
        }
        applied
    }

    pub fn movement_cost(&self, pos: Position) -> Option<MovementCost> {
        self.grid.tile(pos).map(|t| t.movement_cost)
    }

    pub fn set_walkable(&mut self, pos: Position, walkable: bool) -> bool {
        let applied = self.grid.set_walkable(pos, walkable);
        if applied {
            self.cache.invalidate_all();
        }
        applied
    }

    /// 可行走旗標；越界為 false
    pub fn is_walkable(&self, pos: Position) -> bool {
        self.grid.tile(pos).is_some_and(|t| t.is_walkable)
    }

    pub fn set_elevation(&mut self, pos: Position, elevation: Elevation) -> bool {
        self.grid.set_elevation(pos, elevation)
    }

    pub fn elevation(&self, pos: Position) -> Option<Elevation> {
        self.grid.tile(pos).map(|t| t.elevation)
    }

    pub fn set_cover(&mut self, pos: Position, cover: CoverType) -> bool {
        self.grid.set_cover(pos, cover)
    }

    pub fn cover(&self, pos: Position) -> Option<CoverType> {
        self.grid.tile(pos).map(|t| t.cover)
    }

    // ========================================================================
    // 佔據
    // ========================================================================

    pub fn is_occupied(&self, pos: Position) -> bool {
        self.grid.tile(pos).is_some_and(|t| t.is_occupied)
    }

    pub fn occupant_at(&self, pos: Position) -> Option<UnitId> {
        self.occupancy.occupant_at(pos)
    }

    pub fn find_occupant(&self, occupant: UnitId) -> Option<Position> {
        self.occupancy.find_position(occupant)
    }

    /// 所有 (位置, 佔據者)，順序不固定
    pub fn occupants(&self) -> impl Iterator<Item = (Position, UnitId)> + '_ {
        self.occupancy.iter()
    }

    /// `Some` 登記佔據者，`None` 清除該位置
    ///
    /// 登記失敗（越界、不可通行、已被他人佔據、佔據者已在別處）回傳 false
    pub fn set_occupied(&mut self, pos: Position, occupant: Option<UnitId>) -> bool {
        match occupant {
            Some(id) => self.place_occupant(pos, id),
            None => {
                if !self.grid.is_valid_position(pos) {
                    return false;
                }
                self.clear_occupant(pos);
                true
            }
        }
    }

    pub fn place_occupant(&mut self, pos: Position, occupant: UnitId) -> bool {
        if !self.grid.tile(pos).is_some_and(Tile::is_passable) {
            debug!(?pos, occupant, "無法放置佔據者：格子不可通行");
            return false;
        }
        if self.occupancy.occupant_at(pos) == Some(occupant) {
            return true;
        }
        if let Err(e) = self.occupancy.set_occupant(pos, occupant) {
            debug!(?pos, occupant, "無法放置佔據者: {e}");
            return false;
        }
        self.grid.set_occupied_flag(pos, true);
        self.cache.invalidate_all();
        for observer in &mut self.observers {
            observer.on_occupancy_changed(pos, Some(occupant));
        }
        true
    }

    /// 清除位置上的佔據者，回傳被移除者
    pub fn clear_occupant(&mut self, pos: Position) -> Option<UnitId> {
        let removed = self.occupancy.clear_occupant(pos)?;
        self.grid.set_occupied_flag(pos, false);
        self.cache.invalidate_all();
        for observer in &mut self.observers {
            observer.on_occupancy_changed(pos, None);
        }
        Some(removed)
    }

    /// 移動佔據者
    ///
    /// `to` 必須在界內、可通行且未被佔據，`from` 必須是該佔據者目前位置。
    /// 失敗時狀態不變。
    pub fn move_occupant(&mut self, occupant: UnitId, from: Position, to: Position) -> bool {
        if !self.grid.tile(to).is_some_and(Tile::is_passable) {
            debug!(occupant, ?from, ?to, "移動失敗：目標不可通行");
            return false;
        }
        if from == to {
            return self.occupancy.occupant_at(from) == Some(occupant);
        }
        if let Err(e) = self.occupancy.move_occupant(occupant, from, to) {
            debug!(occupant, ?from, ?to, "移動失敗: {e}");
            return false;
        }
        self.grid.set_occupied_flag(from, false);
        self.grid.set_occupied_flag(to, true);
        self.cache.invalidate_all();
        for observer in &mut self.observers {
            observer.on_occupant_moved(occupant, from, to);
        }
        true
    }

    // ========================================================================
    // 路徑
    // ========================================================================

    /// 最短加權路徑，找不到時回傳 `None`
    ///
    /// `ignore_occupied` 為 false 時繞過被佔據的格子，但終點本身可被佔據
    pub fn find_path(
        &mut self,
        start: Position,
        end: Position,
        ignore_occupied: bool,
    ) -> Option<Path> {
        if !self.grid.is_valid_position(start) || !self.grid.is_valid_position(end) {
            return None;
        }

        let key = PathKey {
            start,
            end,
            ignore_occupied,
        };
        if let Some(path) = self.cache.get(&key) {
            debug!(?start, ?end, ignore_occupied, "路徑快取命中");
            return Some(path);
        }

        let view = GridView::new(&self.grid, ignore_occupied);
        match pathfinding::find_path(&view, start, end) {
            Some(path) => {
                self.cache.put(key, &path);
                Some(path)
            }
            None => {
                debug!(?start, ?end, ignore_occupied, "找不到路徑");
                None
            }
        }
    }

    /// 移動力內可到達的位置（含起點）
    pub fn calculate_movement_range(
        &self,
        start: Position,
        movement_points: MovementCost,
    ) -> HashSet<Position> {
        if movement_points < 0.0 {
            warn!(?start, movement_points, "移動力為負數");
        }
        let view = GridView::new(&self.grid, false);
        pathfinding::movement_range(&view, start, movement_points)
    }

    /// 預算內每個可達位置的最低成本與前驅（不含起點）
    pub fn reachable_costs(
        &self,
        start: Position,
        budget: MovementCost,
    ) -> Result<HashMap<Position, ReachableInfo>> {
        let view = GridView::new(&self.grid, false);
        pathfinding::reachable_costs(&view, start, budget)
    }

    /// 路徑總成本；路徑無效時回傳 `None`
    pub fn path_cost(&self, path: &[Position], ignore_occupied: bool) -> Option<MovementCost> {
        let view = GridView::new(&self.grid, ignore_occupied);
        pathfinding::path_cost(&view, path)
    }

    pub fn cached_path_count(&self) -> usize {
        self.cache.len()
    }

    pub fn path_cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    // ========================================================================
    // 存檔
    // ========================================================================

    pub fn to_record(&self) -> GridRecord {
        GridRecord::capture(&self.grid, &self.occupancy)
    }

    /// 以紀錄完整取代目前棋盤；紀錄無效時目前狀態不變
    pub fn apply_record(&mut self, record: &GridRecord) -> Result<()> {
        let (grid, occupancy) = match record.restore() {
            Ok(state) => state,
            Err(e) => {
                warn!("拒絕載入棋盤紀錄: {e}");
                return Err(e);
            }
        };
        self.config.width = grid.width();
        self.config.height = grid.height();
        self.config.cell_size = grid.cell_size();
        self.config.origin = grid.origin().to_array();
        self.replace_state(grid, occupancy);
        Ok(())
    }

    pub fn save_to_file(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let path = path.as_ref();
        self.to_record()
            .write_file(path)
            .context(format!("儲存棋盤 {}", path.display()))?;
        info!(path = %path.display(), tiles = self.grid.tile_count(), "棋盤已儲存");
        Ok(())
    }

    pub fn load_from_file(&mut self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let path = path.as_ref();
        let record = GridRecord::read_file(path)?;
        self.apply_record(&record)
            .context(format!("載入棋盤 {}", path.display()))?;
        info!(
            path = %path.display(),
            width = self.grid.width(),
            height = self.grid.height(),
            "棋盤已載入"
        );
        Ok(())
    }
}

fn mapper_for(grid: &TileGrid) -> CoordinateMapper {
    CoordinateMapper::new(grid.width(), grid.height(), grid.cell_size(), grid.origin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Moved(UnitId, Position, Position),
        Changed(Position, Option<UnitId>),
        Reloaded(Coord, Coord),
    }

    struct Recorder(Rc<RefCell<Vec<Event>>>);

    impl GridObserver for Recorder {
        fn on_occupant_moved(&mut self, occupant: UnitId, from: Position, to: Position) {
            self.0.borrow_mut().push(Event::Moved(occupant, from, to));
        }
        fn on_occupancy_changed(&mut self, pos: Position, occupant: Option<UnitId>) {
            self.0.borrow_mut().push(Event::Changed(pos, occupant));
        }
        fn on_grid_reloaded(&mut self, width: Coord, height: Coord) {
            self.0.borrow_mut().push(Event::Reloaded(width, height));
        }
    }

    #[test]
    fn test_observer_notifications() {
        let mut facade = GridFacade::initialize(3, 3, 1.0, Vec3::ZERO).unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));
        facade.add_observer(Box::new(Recorder(log.clone())));

        assert!(facade.place_occupant(Position::new(0, 0), 1));
        assert!(facade.move_occupant(1, Position::new(0, 0), Position::new(1, 0)));
        assert!(!facade.move_occupant(1, Position::new(0, 0), Position::new(2, 0)));
        assert_eq!(facade.clear_occupant(Position::new(1, 0)), Some(1));
        facade.reinitialize(4, 2, 1.0, Vec3::ZERO).unwrap();

        assert_eq!(
            *log.borrow(),
            vec![
                Event::Changed(Position::new(0, 0), Some(1)),
                Event::Moved(1, Position::new(0, 0), Position::new(1, 0)),
                Event::Changed(Position::new(1, 0), None),
                Event::Reloaded(4, 2),
            ]
        );
    }

    #[test]
    fn test_reinitialize_invalid_keeps_state() {
        let mut facade = GridFacade::initialize(3, 3, 1.0, Vec3::ZERO).unwrap();
        facade.set_terrain_type(Position::new(1, 1), TerrainType::Mud);
        assert!(facade.reinitialize(0, 3, 1.0, Vec3::ZERO).is_err());
        assert_eq!(facade.width(), 3);
        assert_eq!(
            facade.terrain_type(Position::new(1, 1)),
            Some(TerrainType::Mud)
        );
    }

    #[test]
    fn test_terrain_edit_invalidates_cache() {
        let mut facade = GridFacade::initialize(3, 1, 1.0, Vec3::ZERO).unwrap();
        assert!(facade.find_path(Position::new(0, 0), Position::new(2, 0), false).is_some());
        assert_eq!(facade.cached_path_count(), 1);
        facade.set_terrain_type(Position::new(1, 0), TerrainType::Wall);
        assert_eq!(facade.cached_path_count(), 0);
        assert_eq!(
            facade.find_path(Position::new(0, 0), Position::new(2, 0), false),
            None
        );
    }
}

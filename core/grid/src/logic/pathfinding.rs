//! 路徑搜尋
//!
//! - `find_path`：A* 最短加權路徑，四方向，邊權為進入格的移動成本
//! - `movement_range`：依剩餘移動力的洪水填充，每格只造訪一次
//! - `reachable_costs`：Dijkstra，回傳每個可達格的最低成本與前驅
//!
//! 演算法只透過 `PathfindingGrid` 讀取棋盤，測試可用假棋盤替換。

use crate::alias::{Coord, MovementCost};
use crate::core_types::{Path, Position};
use crate::error::{GridError, Result};
use crate::logic::tile_grid::TileGrid;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};
use tracing::trace;

/// 路徑搜尋專用棋盤介面
pub trait PathfindingGrid {
    /// 棋盤寬高
    fn dimensions(&self) -> (Coord, Coord);

    /// 判斷座標是否合法
    fn is_valid(&self, pos: Position) -> bool {
        let (width, height) = self.dimensions();
        pos.x >= 0 && pos.z >= 0 && pos.x < width && pos.z < height
    }

    /// 判斷座標是否可進入；`is_goal` 為終點時可放寬佔據限制
    fn is_passable(&self, pos: Position, is_goal: bool) -> bool;

    /// 進入該座標的移動成本
    fn cost(&self, pos: Position) -> MovementCost;

    /// 合法的四方向鄰居，順序為東、北、西、南
    fn neighbors(&self, pos: Position) -> Vec<Position> {
        pos.neighbors().filter(|n| self.is_valid(*n)).collect()
    }
}

/// `TileGrid` 的搜尋視圖
///
/// `ignore_occupied` 為 false 時被佔據的格子不可通行，終點例外：
/// 終點可以是被佔據的格子（例如走到目標單位所在格）。
#[derive(Debug, Clone, Copy)]
pub struct GridView<'a> {
    grid: &'a TileGrid,
    ignore_occupied: bool,
}

impl<'a> GridView<'a> {
    pub fn new(grid: &'a TileGrid, ignore_occupied: bool) -> Self {
        Self {
            grid,
            ignore_occupied,
        }
    }
}

impl PathfindingGrid for GridView<'_> {
    fn dimensions(&self) -> (Coord, Coord) {
        (self.grid.width(), self.grid.height())
    }

    fn is_valid(&self, pos: Position) -> bool {
        self.grid.is_valid_position(pos)
    }

    fn is_passable(&self, pos: Position, is_goal: bool) -> bool {
        match self.grid.tile(pos) {
            None => false,
            Some(tile) => {
                if !tile.is_passable() {
                    return false;
                }
                self.ignore_occupied || is_goal || !tile.is_occupied
            }
        }
    }

    fn cost(&self, pos: Position) -> MovementCost {
        self.grid
            .tile(pos)
            .map_or(MovementCost::INFINITY, |t| t.movement_cost)
    }
}

// ============================================================================
// A*
// ============================================================================

/// 開放集合項目（反轉排序成最小堆）
///
/// f 值相同時先進先出，展開順序因此跟隨鄰居列舉順序
#[derive(Debug)]
struct OpenEntry {
    score: MovementCost,
    seq: u64,
    pos: Position,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// 曼哈頓距離啟發值
///
/// 所有成本 >= 1 時可採納；成本小於 1 的格子可能讓結果不是最短路徑
fn heuristic(from: Position, to: Position) -> MovementCost {
    from.manhattan_distance(to) as MovementCost
}

/// A* 最短加權路徑
///
/// 起點或終點不合法、或無路可走時回傳 `None`（這是常見的正常結果）。
/// 起點本身不檢查通行性。
pub fn find_path(grid: &impl PathfindingGrid, start: Position, goal: Position) -> Option<Path> {
    if !grid.is_valid(start) || !grid.is_valid(goal) {
        return None;
    }
    if start == goal {
        return Some(vec![start]);
    }

    let mut g_score: HashMap<Position, MovementCost> = HashMap::new();
    let mut came_from: HashMap<Position, Position> = HashMap::new();
    let mut closed: HashSet<Position> = HashSet::new();
    let mut open = BinaryHeap::new();
    let mut seq = 0u64;

    g_score.insert(start, 0.0);
    open.push(OpenEntry {
        score: heuristic(start, goal),
        seq,
        pos: start,
    });

    while let Some(OpenEntry { pos: current, .. }) = open.pop() {
        if current == goal {
            trace!(?start, ?goal, expanded = closed.len(), "A* 找到路徑");
            return Some(walk_back(&came_from, start, goal));
        }
        if !closed.insert(current) {
            continue;
        }

        let current_g = g_score[&current];
        for next in grid.neighbors(current) {
            if closed.contains(&next) {
                continue;
            }
            if !grid.is_passable(next, next == goal) {
                continue;
            }
            let tentative = current_g + grid.cost(next);
            let best = g_score.get(&next).copied().unwrap_or(MovementCost::INFINITY);
            if tentative < best {
                g_score.insert(next, tentative);
                came_from.insert(next, current);
                seq += 1;
                open.push(OpenEntry {
                    score: tentative + heuristic(next, goal),
                    seq,
                    pos: next,
                });
            }
        }
    }

    trace!(?start, ?goal, expanded = closed.len(), "A* 開放集合耗盡");
    None
}

// 呼叫端保證 goal 可由 came_from 追溯回 start
fn walk_back(came_from: &HashMap<Position, Position>, start: Position, goal: Position) -> Path {
    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        current = came_from[&current];
        path.push(current);
    }
    path.reverse();
    path
}

// ============================================================================
// 移動範圍
// ============================================================================

/// 移動力預算內可到達的所有位置（含起點）
///
/// 先進先出的洪水填充，每格只在第一次到達時登記剩餘移動力，
/// 之後即使有剩餘更多的路線也不重新考慮。地形成本不一時結果是近似值；
/// 需要最佳解請用 `reachable_costs`。
///
/// 鄰居需可通行、未被佔據、且扣除成本後剩餘 >= 0。
/// 起點一律包含在結果中，即使預算為 0。起點不合法時回傳空集合。
pub fn movement_range(
    grid: &impl PathfindingGrid,
    start: Position,
    movement_points: MovementCost,
) -> HashSet<Position> {
    let mut reached = HashSet::new();
    if !grid.is_valid(start) {
        return reached;
    }

    reached.insert(start);
    let mut queue = VecDeque::from([(start, movement_points)]);

    while let Some((pos, remaining)) = queue.pop_front() {
        for next in grid.neighbors(pos) {
            if reached.contains(&next) {
                continue;
            }
            if !grid.is_passable(next, false) {
                continue;
            }
            let left = remaining - grid.cost(next);
            if !(left >= 0.0) {
                continue;
            }
            reached.insert(next);
            queue.push_back((next, left));
        }
    }

    reached
}

// ============================================================================
// Dijkstra
// ============================================================================

/// 可到達位置的資訊（含成本與前驅節點）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReachableInfo {
    pub cost: MovementCost,
    pub prev: Position, // 上一個位置（可能是起點）
}

/// 預算內每個可達位置的最低成本與前驅（不含起點）
///
/// # Fail fast 驗證：
/// - 起點必須在棋盤內
pub fn reachable_costs(
    grid: &impl PathfindingGrid,
    start: Position,
    budget: MovementCost,
) -> Result<HashMap<Position, ReachableInfo>> {
    if !grid.is_valid(start) {
        let (width, height) = grid.dimensions();
        return Err(GridError::OutOfBounds {
            x: start.x,
            z: start.z,
            width,
            height,
        }
        .into());
    }

    let mut dist: HashMap<Position, MovementCost> = HashMap::new();
    let mut prev: HashMap<Position, Position> = HashMap::new();
    let mut queue = BinaryHeap::new();
    let mut seq = 0u64;

    dist.insert(start, 0.0);
    queue.push(OpenEntry {
        score: 0.0,
        seq,
        pos: start,
    });

    while let Some(OpenEntry { score, pos, .. }) = queue.pop() {
        // 跳過過時的隊列項（已有更優路徑）
        if score > dist[&pos] {
            continue;
        }
        for next in grid.neighbors(pos) {
            if !grid.is_passable(next, false) {
                continue;
            }
            let new_cost = score + grid.cost(next);
            if !(new_cost <= budget) {
                continue;
            }
            let best = dist.get(&next).copied().unwrap_or(MovementCost::INFINITY);
            if new_cost < best {
                dist.insert(next, new_cost);
                prev.insert(next, pos);
                seq += 1;
                queue.push(OpenEntry {
                    score: new_cost,
                    seq,
                    pos: next,
                });
            }
        }
    }

    let reachable = dist
        .into_iter()
        .filter(|(pos, _)| *pos != start)
        .map(|(pos, cost)| {
            (
                pos,
                ReachableInfo {
                    cost,
                    prev: prev[&pos],
                },
            )
        })
        .collect();
    Ok(reachable)
}

/// 由 `reachable_costs` 的結果重建路徑；`to` 不在結果中時回傳 `None`
pub fn reconstruct_path(
    map: &HashMap<Position, ReachableInfo>,
    from: Position,
    to: Position,
) -> Option<Path> {
    let mut path = Vec::new();
    let mut current = to;
    while current != from {
        let info = map.get(&current)?;
        path.push(current);
        current = info.prev;
    }
    path.push(from);
    path.reverse();
    Some(path)
}

/// 路徑總成本（不含起點）；路徑不連續或經過不可通行格時回傳 `None`
pub fn path_cost(grid: &impl PathfindingGrid, path: &[Position]) -> Option<MovementCost> {
    let (first, rest) = path.split_first()?;
    if !grid.is_valid(*first) {
        return None;
    }
    let mut total = 0.0;
    let mut current = *first;
    for (idx, next) in rest.iter().enumerate() {
        let is_goal = idx + 1 == rest.len();
        if !current.is_adjacent(*next) || !grid.is_passable(*next, is_goal) {
            return None;
        }
        total += grid.cost(*next);
        current = *next;
    }
    Some(total)
}

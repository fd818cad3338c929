//! 格子座標與世界座標轉換
//!
//! 格子中心對應世界座標，因此 `world_to_grid(grid_to_world(p)) == p`。

use crate::alias::{Coord, Elevation};
use crate::core_types::Position;
use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    width: Coord,
    height: Coord,
    cell_size: f32,
    origin: Vec3,
}

impl CoordinateMapper {
    pub fn new(width: Coord, height: Coord, cell_size: f32, origin: Vec3) -> Self {
        Self {
            width,
            height,
            cell_size,
            origin,
        }
    }

    fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.z >= 0 && pos.x < self.width && pos.z < self.height
    }

    /// 格子中心的世界座標，y 軸為格子高度
    pub fn grid_to_world(&self, pos: Position, elevation: Elevation) -> Vec3 {
        let half = self.cell_size / 2.0;
        self.origin
            + Vec3::new(
                pos.x as f32 * self.cell_size + half,
                elevation,
                pos.z as f32 * self.cell_size + half,
            )
    }

    /// 世界座標所在的格子，以及該格是否在棋盤內
    ///
    /// x 或 z 不是有限值（NaN、無限大）時一律視為無效
    pub fn world_to_grid(&self, point: Vec3) -> (Position, bool) {
        let local = (point - self.origin) / self.cell_size;
        let pos = Position {
            x: local.x.floor() as Coord,
            z: local.z.floor() as Coord,
        };
        let finite = local.x.is_finite() && local.z.is_finite();
        (pos, finite && self.in_bounds(pos))
    }

    pub fn world_to_grid_checked(&self, point: Vec3) -> Option<Position> {
        match self.world_to_grid(point) {
            (pos, true) => Some(pos),
            (_, false) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_to_world_is_cell_center() {
        let mapper = CoordinateMapper::new(4, 4, 2.0, Vec3::new(10.0, 5.0, -4.0));
        assert_eq!(
            mapper.grid_to_world(Position::new(0, 0), 0.0),
            Vec3::new(11.0, 5.0, -3.0)
        );
        assert_eq!(
            mapper.grid_to_world(Position::new(3, 1), 1.5),
            Vec3::new(17.0, 6.5, -1.0)
        );
    }

    #[test]
    fn test_roundtrip() {
        let mapper = CoordinateMapper::new(7, 5, 0.75, Vec3::new(-3.2, 0.0, 8.1));
        for z in 0..5 {
            for x in 0..7 {
                let pos = Position::new(x, z);
                let world = mapper.grid_to_world(pos, 2.0);
                assert_eq!(mapper.world_to_grid(world), (pos, true), "{pos:?}");
            }
        }
    }

    #[test]
    fn test_world_to_grid_outside() {
        let mapper = CoordinateMapper::new(3, 3, 1.0, Vec3::ZERO);
        assert_eq!(
            mapper.world_to_grid(Vec3::new(-0.5, 0.0, 0.5)),
            (Position::new(-1, 0), false)
        );
        assert_eq!(
            mapper.world_to_grid(Vec3::new(3.0, 0.0, 0.5)),
            (Position::new(3, 0), false)
        );
        assert_eq!(
            mapper.world_to_grid_checked(Vec3::new(2.99, 9.0, 2.99)),
            Some(Position::new(2, 2))
        );
        assert_eq!(
            mapper.world_to_grid_checked(Vec3::new(1.0, 0.0, -0.01)),
            None
        );
    }

    #[test]
    fn test_world_to_grid_non_finite() {
        let mapper = CoordinateMapper::new(4, 4, 1.0, Vec3::ZERO);
        let test_data = [
            Vec3::new(f32::NAN, 0.0, f32::NAN),
            Vec3::new(f32::NAN, 0.0, 1.5),
            Vec3::new(1.5, 0.0, f32::NAN),
            Vec3::new(f32::INFINITY, 0.0, 1.5),
            Vec3::new(1.5, 0.0, f32::NEG_INFINITY),
        ];
        for (idx, point) in test_data.into_iter().enumerate() {
            assert!(!mapper.world_to_grid(point).1, "Case {}", idx);
            assert_eq!(mapper.world_to_grid_checked(point), None, "Case {}", idx);
        }
        // 高度不參與判定
        assert_eq!(
            mapper.world_to_grid_checked(Vec3::new(1.5, f32::NAN, 1.5)),
            Some(Position::new(1, 1))
        );
    }
}

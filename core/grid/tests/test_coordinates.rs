//! 格子與世界座標轉換測試

use glam::Vec3;
use tactical_grid::{GridFacade, Position};

#[test]
fn test_round_trip_all_cells() {
    let test_data = [
        (4, 3, 1.0, Vec3::ZERO),
        (5, 5, 2.0, Vec3::new(10.0, 0.0, -6.0)),
        (3, 7, 0.5, Vec3::new(-1.25, 3.0, 2.5)),
    ];
    for (idx, (width, height, cell_size, origin)) in test_data.into_iter().enumerate() {
        let facade = GridFacade::initialize(width, height, cell_size, origin).unwrap();
        for x in 0..width {
            for z in 0..height {
                let pos = Position::new(x, z);
                let world = facade.grid_to_world(pos);
                assert_eq!(facade.world_to_grid(world), (pos, true), "Case {}", idx);
                assert_eq!(
                    facade.world_to_grid_checked(world),
                    Some(pos),
                    "Case {}",
                    idx
                );
            }
        }
    }
}

#[test]
fn test_elevation_in_world_y() {
    let mut facade = GridFacade::initialize(3, 3, 2.0, Vec3::new(0.0, 1.0, 0.0)).unwrap();
    assert!(facade.set_elevation(Position::new(1, 2), 2.5));
    let world = facade.grid_to_world(Position::new(1, 2));
    assert_eq!(world, Vec3::new(3.0, 3.5, 5.0));
    // 高度不影響反向轉換
    assert_eq!(facade.world_to_grid(world), (Position::new(1, 2), true));
}

#[test]
fn test_outside_points() {
    let facade = GridFacade::initialize(4, 4, 1.0, Vec3::ZERO).unwrap();
    let test_data = [
        (Vec3::new(-0.5, 0.0, 0.5), Position::new(-1, 0)),
        (Vec3::new(4.0, 0.0, 0.5), Position::new(4, 0)),
        (Vec3::new(1.5, 0.0, 9.9), Position::new(1, 9)),
        (Vec3::new(-3.2, 0.0, -0.1), Position::new(-4, -1)),
        // NaN 轉成整數為 0，但不可視為 (0, 0)
        (Vec3::new(f32::NAN, 0.0, f32::NAN), Position::new(0, 0)),
        (Vec3::new(f32::NAN, 0.0, 2.5), Position::new(0, 2)),
    ];
    for (idx, (point, expected)) in test_data.into_iter().enumerate() {
        assert_eq!(
            facade.world_to_grid(point),
            (expected, false),
            "Case {}",
            idx
        );
        assert_eq!(facade.world_to_grid_checked(point), None, "Case {}", idx);
    }
}

#[test]
fn test_cell_edges() {
    let facade = GridFacade::initialize(4, 4, 2.0, Vec3::ZERO).unwrap();
    // 下緣屬於該格，上緣屬於下一格
    assert_eq!(
        facade.world_to_grid_checked(Vec3::new(2.0, 0.0, 0.0)),
        Some(Position::new(1, 0))
    );
    assert_eq!(
        facade.world_to_grid_checked(Vec3::new(1.999, 0.0, 3.999)),
        Some(Position::new(0, 1))
    );
    assert_eq!(facade.world_to_grid_checked(Vec3::new(8.0, 0.0, 0.0)), None);
}

//! 測試輔助：建立棋盤與驗證路徑

use glam::Vec3;
use tactical_grid::{GridFacade, Position};

/// 全平地、格子大小 1 的棋盤
pub fn open_grid(width: i32, height: i32) -> GridFacade {
    GridFacade::initialize(width, height, 1.0, Vec3::ZERO).expect("測試棋盤尺寸有效")
}

/// 驗證路徑：起終點正確、每步四方向相鄰、除終點外都可通行且（未忽略佔據時）未被佔據
pub fn assert_path_valid(
    facade: &GridFacade,
    path: &[Position],
    start: Position,
    end: Position,
    ignore_occupied: bool,
) {
    assert_eq!(path.first(), Some(&start), "路徑起點錯誤: {path:?}");
    assert_eq!(path.last(), Some(&end), "路徑終點錯誤: {path:?}");
    for pair in path.windows(2) {
        assert!(pair[0].is_adjacent(pair[1]), "路徑不連續: {pair:?}");
    }
    for pos in &path[1..] {
        let tile = facade.tile(*pos).expect("路徑上的格子必須在棋盤內");
        assert!(tile.is_passable(), "路徑經過不可通行的 {pos:?}");
        if !ignore_occupied && *pos != end {
            assert!(!tile.is_occupied, "路徑經過被佔據的 {pos:?}");
        }
    }
}

/// 安裝測試用 tracing subscriber，可重複呼叫
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

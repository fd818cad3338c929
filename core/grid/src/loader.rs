//! 從 ASCII 地圖建立棋盤
//!
//! 每行用空格分隔的符號，第一行是最北邊（z 最大）的一列：
//! - `.` 平地、`#` 牆、`O` 障礙物、`~` 水、`m` 泥、`s` 沙、`=` 道路、
//!   `r` 岩石、`^` 岩漿、`i` 冰、`*` 雪、`g` 草、`M` 金屬
//! - 其他字串（`S`、`E` 等）= 標記位置（平地），相同的標記會全部收集成 Vec
//!
//! 例如：
//! ```text
//! . . E
//! . # .
//! S . .
//! ```

use crate::core_types::{Position, TerrainType};
use crate::error::{LoadError, Result};
use crate::facade::GridFacade;
use glam::Vec3;
use std::collections::HashMap;

/// 符號對應的地形；非地形符號回傳 `None`
pub fn terrain_symbol(symbol: &str) -> Option<TerrainType> {
    let terrain = match symbol {
        "." => TerrainType::Ground,
        "#" => TerrainType::Wall,
        "O" => TerrainType::Obstacle,
        "~" => TerrainType::Water,
        "m" => TerrainType::Mud,
        "s" => TerrainType::Sand,
        "=" => TerrainType::Road,
        "r" => TerrainType::Rocks,
        "^" => TerrainType::Lava,
        "i" => TerrainType::Ice,
        "*" => TerrainType::Snow,
        "g" => TerrainType::Grass,
        "M" => TerrainType::Metal,
        _ => return None,
    };
    Some(terrain)
}

/// 從 ASCII 格式載入棋盤（格子大小 1，原點在世界原點）
///
/// 返回：(棋盤, 標記映射)
pub fn load_from_ascii(ascii: &str) -> Result<(GridFacade, HashMap<String, Vec<Position>>)> {
    let rows: Vec<Vec<&str>> = ascii
        .lines()
        .map(|l| l.split_whitespace().collect::<Vec<_>>())
        .filter(|row| !row.is_empty())
        .collect();

    if rows.is_empty() {
        return Err(LoadError::ParseError("棋盤為空".to_string()).into());
    }

    // 推導寬度（第一行的符號數）
    let width = rows[0].len();
    if let Some((idx, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != width) {
        return Err(LoadError::ParseError(format!(
            "第 {} 行有 {} 個符號，預期 {}",
            idx + 1,
            row.len(),
            width
        ))
        .into());
    }

    let width = width
        .try_into()
        .map_err(|_| LoadError::ParseError("棋盤寬度過大".to_string()))?;
    let height = rows
        .len()
        .try_into()
        .map_err(|_| LoadError::ParseError("棋盤高度過大".to_string()))?;

    let mut facade = GridFacade::initialize(width, height, 1.0, Vec3::ZERO)?;
    let mut markers: HashMap<String, Vec<Position>> = HashMap::new();

    for (row_idx, row) in rows.iter().enumerate() {
        let z = height - 1 - row_idx as i32;
        for (x, symbol) in row.iter().enumerate() {
            let pos = Position { x: x as i32, z };
            match terrain_symbol(symbol) {
                Some(TerrainType::Ground) => {}
                Some(terrain) => {
                    facade.set_terrain_type(pos, terrain);
                }
                None => markers.entry(symbol.to_string()).or_default().push(pos),
            }
        }
    }

    Ok((facade, markers))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_rows_are_north_first() {
        let ascii = r#"
. . E
. # .
S . ~
    "#;
        let (facade, markers) = load_from_ascii(ascii).unwrap();
        assert_eq!(facade.width(), 3);
        assert_eq!(facade.height(), 3);
        assert_eq!(markers["S"], vec![Position::new(0, 0)]);
        assert_eq!(markers["E"], vec![Position::new(2, 2)]);
        assert_eq!(
            facade.terrain_type(Position::new(1, 1)),
            Some(TerrainType::Wall)
        );
        assert_eq!(
            facade.terrain_type(Position::new(2, 0)),
            Some(TerrainType::Water)
        );
        assert_eq!(facade.movement_cost(Position::new(2, 0)), Some(3.0));
    }

    #[test]
    fn test_ascii_errors() {
        assert!(load_from_ascii("   \n  ").is_err());
        assert!(load_from_ascii(". .\n. . .").is_err());
    }

    #[test]
    fn test_repeated_markers() {
        let (_, markers) = load_from_ascii("A . A\nB A .").unwrap();
        assert_eq!(markers["A"].len(), 3);
        assert_eq!(markers["B"], vec![Position::new(0, 0)]);
    }
}

//! 佔據者位置索引
//!
//! 同時維護兩個方向的 mapping，確保兩者永遠同步：
//! - `Position → UnitId`：查詢某位置的佔據者
//! - `UnitId → Position`：查詢某佔據者在哪個位置
//!
//! 只管理「誰在哪」的關聯，不管理佔據者本身的生命週期，也不檢查地形。

use crate::alias::UnitId;
use crate::core_types::Position;
use crate::error::{OccupancyError, Result};
use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
pub struct OccupancyTracker {
    pos_to_occupant: HashMap<Position, UnitId>,
    occupant_to_pos: HashMap<UnitId, Position>,
}

impl OccupancyTracker {
    /// 查詢指定位置的佔據者
    pub fn occupant_at(&self, pos: Position) -> Option<UnitId> {
        self.pos_to_occupant.get(&pos).copied()
    }

    /// 查詢指定佔據者的位置
    pub fn find_position(&self, occupant: UnitId) -> Option<Position> {
        self.occupant_to_pos.get(&occupant).copied()
    }

    pub fn is_occupied(&self, pos: Position) -> bool {
        self.pos_to_occupant.contains_key(&pos)
    }

    /// 登記佔據者到指定位置
    ///
    /// 同一佔據者重複登記同一位置視為成功；
    /// 位置已有其他佔據者、或佔據者已在別處時回傳錯誤。
    pub fn set_occupant(&mut self, pos: Position, occupant: UnitId) -> Result<()> {
        if let Some(existing) = self.occupant_at(pos) {
            if existing == occupant {
                return Ok(());
            }
            return Err(OccupancyError::PositionTaken { pos, existing }.into());
        }
        if let Some(existing_pos) = self.find_position(occupant) {
            return Err(OccupancyError::OccupantAlreadyPlaced {
                occupant,
                pos: existing_pos,
            }
            .into());
        }

        self.pos_to_occupant.insert(pos, occupant);
        self.occupant_to_pos.insert(occupant, pos);
        Ok(())
    }

    /// 清除指定位置的佔據者，回傳被移除者
    pub fn clear_occupant(&mut self, pos: Position) -> Option<UnitId> {
        let occupant = self.pos_to_occupant.remove(&pos)?;
        self.occupant_to_pos.remove(&occupant);
        Some(occupant)
    }

    /// 移動佔據者；失敗時兩個 mapping 都不變
    pub fn move_occupant(&mut self, occupant: UnitId, from: Position, to: Position) -> Result<()> {
        if self.occupant_at(from) != Some(occupant) {
            return Err(OccupancyError::OccupantNotAt {
                occupant,
                pos: from,
            }
            .into());
        }
        if from == to {
            return Ok(());
        }
        if let Some(existing) = self.occupant_at(to) {
            return Err(OccupancyError::PositionTaken { pos: to, existing }.into());
        }

        self.pos_to_occupant.remove(&from);
        self.pos_to_occupant.insert(to, occupant);
        self.occupant_to_pos.insert(occupant, to);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.pos_to_occupant.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pos_to_occupant.is_empty()
    }

    /// 所有 (位置, 佔據者)，順序不固定
    pub fn iter(&self) -> impl Iterator<Item = (Position, UnitId)> + '_ {
        self.pos_to_occupant.iter().map(|(pos, id)| (*pos, *id))
    }

    pub fn clear(&mut self) {
        self.pos_to_occupant.clear();
        self.occupant_to_pos.clear();
    }
}

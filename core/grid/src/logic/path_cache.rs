//! 路徑快取
//!
//! 以 (起點, 終點, 是否忽略佔據) 為鍵。任何佔據變化都整批清空，
//! 不做細粒度失效。

use crate::constants::DEFAULT_PATH_CACHE_CAPACITY;
use crate::core_types::{Path, Position};
use std::collections::HashMap;

/// 快取鍵
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathKey {
    pub start: Position,
    pub end: Position,
    pub ignore_occupied: bool,
}

/// 命中統計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub invalidations: u64,
}

#[derive(Debug, Clone)]
pub struct PathCache {
    capacity: usize,
    entries: HashMap<PathKey, Path>,
    stats: CacheStats,
}

impl Default for PathCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_PATH_CACHE_CAPACITY)
    }
}

impl PathCache {
    /// 容量為 0 時不快取任何路徑
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            stats: CacheStats::default(),
        }
    }

    /// 取出快取路徑的複本
    pub fn get(&mut self, key: &PathKey) -> Option<Path> {
        match self.entries.get(key) {
            Some(path) => {
                self.stats.hits += 1;
                Some(path.clone())
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// 存入路徑複本；已滿時先整批清空
    pub fn put(&mut self, key: PathKey, path: &[Position]) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() >= self.capacity && !self.entries.contains_key(&key) {
            self.entries.clear();
        }
        self.entries.insert(key, path.to_vec());
    }

    pub fn invalidate_all(&mut self) {
        if !self.entries.is_empty() {
            self.stats.invalidations += 1;
        }
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

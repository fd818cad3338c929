//! 整合測試共用輔助
#![allow(dead_code)]

pub mod grid_builder;

//! 目录元数据采集
//!
//! 每类对象一个子模块，向活动数据库发起固定的目录查询并物化为
//! 内存快照。所有查询只读，任何情况下不得修改被检查的数据库。
//! 快照只在单次比对调用内存活，每次运行都重新采集。

pub mod config;
pub mod routine;
pub mod table;
pub mod trigger;
pub mod view;

//! 任务模块
//!
//! 流水线的全部可调度任务:
//! - `heartbeat`: 节拍驱动 (许可扇出 + 周期计算)
//! - `poll`: 两个独立的传感器采样任务
//! - `fusion`: 读数配对、异或融合与 SHA-256 摘要
//! - `control`: 按钮中断延迟处理与频率档位推进
//! - `indicator`: 采样指示灯

pub mod control;
pub mod fusion;
pub mod heartbeat;
pub mod indicator;
pub mod poll;

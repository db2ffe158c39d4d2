//! 同步原语模块
//!
//! 提供线程安全的同步原语，基于 embassy-sync 封装:
//! - `CriticalSignal`: 单值信号量
//! - `CriticalChannel`: 有界消息队列
//! - `CriticalMutex`: 异步互斥锁
//! - `RateScaler`: 互斥保护的采样频率寄存器

pub mod primitives;
pub mod rate;

pub use primitives::{CriticalChannel, CriticalMutex, CriticalSignal};
pub use rate::RateScaler;

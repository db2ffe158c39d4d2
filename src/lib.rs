//! SenseFuse - ESP32-S3 自适应双传感器采样流水线库
//!
//! 本库提供以下核心功能:
//! - 心跳驱动的周期采样编排 (基于 Embassy)
//! - 容量为 1 的背压式读数交接通道
//! - 按钮中断驱动的采样频率调节 (1~7 档循环)
//! - BMP180 / HC-SR04 传感器驱动与 SHA-256 读数摘要

#![no_std]

pub mod drivers;
pub mod sync;
pub mod tasks;
pub mod util;

// ===== 重导出常用类型 =====
pub use sync::primitives::{
    CriticalChannel,
    CriticalMutex,
    CriticalSignal,
};
pub use sync::rate::RateScaler;

// ===== 版本信息 =====
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// 系统配置常量
pub mod config {
    use embassy_time::Duration;

    /// 基准采样周期 (µs) - 对应频率档位 1
    pub const BASE_DELAY_US: u64 = 1_000_000;

    /// 频率档位下限
    pub const RATE_MIN: u8 = 1;

    /// 频率档位上限 (超过后回绕到下限)
    pub const RATE_MAX: u8 = 7;

    /// 板载指示 LED 的脉冲宽度
    pub const BLINK_PULSE: Duration = Duration::from_millis(50);

    /// SR04 回波等待上限 (约 4m 量程对应 24ms, 留足余量)
    pub const ECHO_TIMEOUT: Duration = Duration::from_millis(60);

    /// BMP180 温度转换时间 (数据手册: 最大 4.5ms)
    pub const BMP180_CONVERSION_DELAY: Duration = Duration::from_millis(5);
}

//! 传感器与指示器驱动
//!
//! 流水线的外部协作者:
//! - `bmp180`: I2C 温度传感器 (°C)
//! - `sr04`: 超声波距离传感器 (m)
//! - `leds`: 三位 LED 档位显示架

pub mod bmp180;
pub mod leds;
pub mod sr04;

pub use bmp180::{Bmp180, Bmp180Error};
pub use leds::RateStand;
pub use sr04::{Sr04, Sr04Error};

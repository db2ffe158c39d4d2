//! HC-SR04 超声波距离传感器驱动
//!
//! 测量流程: 触发脚拉高 10µs 发出超声脉冲, 回波脚的高电平宽度
//! 正比于声波往返时间, 距离 = 声速 × 脉宽 / 2。
//!
//! 两次回波等待都有超时上限: 没有回波 (目标超出量程或接线问题)
//! 时返回错误而不是永久自旋, 采样任务据此跳过本拍。

use embassy_time::{with_timeout, Duration, Instant};
use embedded_hal::digital::OutputPin;
use embedded_hal_async::digital::Wait;

use crate::config::ECHO_TIMEOUT;

/// 声速 (m/s, 干燥空气 ~15°C)
const SPEED_OF_SOUND: f64 = 340.0;

/// 触发脉冲宽度
const TRIGGER_PULSE: Duration = Duration::from_micros(10);

// ===== 错误类型 =====

/// SR04 驱动错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sr04Error {
    /// 引脚操作失败
    Pin,
    /// 等待回波超时
    EchoTimeout,
}

impl Sr04Error {
    /// 日志友好的静态描述
    pub fn as_str(&self) -> &'static str {
        match self {
            Sr04Error::Pin => "pin error",
            Sr04Error::EchoTimeout => "echo timeout",
        }
    }
}

impl core::fmt::Display for Sr04Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ===== 驱动 =====

/// HC-SR04 距离传感器
pub struct Sr04<TRIG, ECHO> {
    trigger: TRIG,
    echo: ECHO,
}

impl<TRIG, ECHO> Sr04<TRIG, ECHO>
where
    TRIG: OutputPin,
    ECHO: Wait,
{
    /// 创建驱动, 触发脚应已配置为推挽输出、回波脚为下拉输入
    pub fn new(trigger: TRIG, echo: ECHO) -> Self {
        Self { trigger, echo }
    }

    /// 采样一次距离 (m)
    pub async fn read_distance(&mut self) -> Result<f64, Sr04Error> {
        // 10µs 触发脉冲
        self.trigger.set_high().map_err(|_| Sr04Error::Pin)?;
        embassy_time::Timer::after(TRIGGER_PULSE).await;
        self.trigger.set_low().map_err(|_| Sr04Error::Pin)?;

        // 回波上升沿
        with_timeout(ECHO_TIMEOUT, self.echo.wait_for_high())
            .await
            .map_err(|_| Sr04Error::EchoTimeout)?
            .map_err(|_| Sr04Error::Pin)?;
        let rising = Instant::now();

        // 回波下降沿, 脉宽即往返时间
        with_timeout(ECHO_TIMEOUT, self.echo.wait_for_low())
            .await
            .map_err(|_| Sr04Error::EchoTimeout)?
            .map_err(|_| Sr04Error::Pin)?;
        let pulse_us = rising.elapsed().as_micros();

        Ok(pulse_width_to_distance(pulse_us))
    }
}

/// 回波脉宽 (µs) 换算为距离 (m)
#[inline]
fn pulse_width_to_distance(pulse_us: u64) -> f64 {
    SPEED_OF_SOUND * pulse_us as f64 / 2_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pulse_width_mapping() {
        // 1m 距离对应 2m 往返 ≈ 5882µs
        let d = pulse_width_to_distance(5882);
        assert!((d - 1.0).abs() < 0.001);

        // 零脉宽 = 零距离
        assert_eq!(pulse_width_to_distance(0), 0.0);
    }

    #[test]
    fn test_pulse_width_is_linear() {
        let d1 = pulse_width_to_distance(1000);
        let d2 = pulse_width_to_distance(2000);
        assert!((d2 - 2.0 * d1).abs() < 1e-12);
    }
}

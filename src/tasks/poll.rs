//! 传感器采样任务
//!
//! 每个传感器一个任务, 两者互不耦合, 只通过采样许可与融合任务的
//! 联合消费间接同步。循环逻辑:
//! 1. 等待本拍采样许可, 等待上限为当前节拍周期
//!    (拿不到许可的任务不会永久停摆, 超时后重新评估周期)
//! 2. 调用传感器驱动采样; 驱动失败时本拍跳过, 不发送陈旧值或哨兵值
//! 3. 将读数送入容量为 1 的交接通道, 上一个读数未被取走时阻塞 (背压)

use embassy_futures::select::{select, Either};
use embassy_time::Timer;
use esp_hal::gpio::{Input, Output};
use esp_hal::i2c::master::I2c;
use esp_hal::Blocking;

use crate::drivers::{Bmp180, Sr04};
use crate::sync::primitives::CriticalChannel;
use crate::tasks::heartbeat::{tick_delay, DIST_PERMIT, RATE, TEMP_PERMIT};
use crate::util::log::*;

// ===== 读数交接通道 =====
// 容量恰为 1: 任意时刻最多一个未读值, 发送方在值被取走前阻塞,
// 生产节奏由消费节奏反压, 不会无界增长也不会静默覆盖

/// 温度读数交接通道 (°C)
pub static TEMP_READINGS: CriticalChannel<f64, 1> = CriticalChannel::new();

/// 距离读数交接通道 (m)
pub static DIST_READINGS: CriticalChannel<f64, 1> = CriticalChannel::new();

// ===== 温度采样任务 =====
/// BMP180 温度采样任务
#[embassy_executor::task]
pub async fn poll_temperature_task(mut sensor: Bmp180<I2c<'static, Blocking>>) {
    log_info!("Temperature poller started (BMP180)");

    loop {
        // 许可等待以当前节拍周期为上限
        let deadline = tick_delay(RATE.read());
        if let Either::Second(()) = select(TEMP_PERMIT.wait(), Timer::after(deadline)).await {
            continue;
        }

        match sensor.read_temperature().await {
            Ok(temperature) => {
                log_trace!("BMP180: {}C", temperature);
                TEMP_READINGS.send(temperature).await;
            }
            Err(e) => {
                // 本拍无读数, 融合任务多等一拍
                log_warn!("BMP180 read failed ({}), skipping cycle", e.as_str());
            }
        }
    }
}

// ===== 距离采样任务 =====
/// HC-SR04 距离采样任务
#[embassy_executor::task]
pub async fn poll_distance_task(mut sensor: Sr04<Output<'static>, Input<'static>>) {
    log_info!("Distance poller started (HC-SR04)");

    loop {
        let deadline = tick_delay(RATE.read());
        if let Either::Second(()) = select(DIST_PERMIT.wait(), Timer::after(deadline)).await {
            continue;
        }

        match sensor.read_distance().await {
            Ok(distance) => {
                log_trace!("SR04: {}m", distance);
                DIST_READINGS.send(distance).await;
            }
            Err(e) => {
                log_warn!("SR04 read failed ({}), skipping cycle", e.as_str());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_holds_single_unread_value() {
        // 容量恰为 1: 未读值在位时第二次发送不成功, 绝不静默覆盖
        assert!(TEMP_READINGS.try_send(22.5).is_ok());
        assert!(TEMP_READINGS.try_send(23.0).is_err());

        // 取走后槽位重新可用, 且值未被覆盖
        assert_eq!(TEMP_READINGS.try_receive(), Ok(22.5));
        assert!(TEMP_READINGS.try_send(23.0).is_ok());
        assert_eq!(TEMP_READINGS.try_receive(), Ok(23.0));
    }

    #[test]
    fn test_distance_channel_backpressure() {
        assert!(DIST_READINGS.try_send(1.30).is_ok());
        assert!(DIST_READINGS.try_send(1.31).is_err());
        assert_eq!(DIST_READINGS.try_receive(), Ok(1.30));
        assert!(DIST_READINGS.try_receive().is_err());
    }
}

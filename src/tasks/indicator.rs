//! 采样指示灯任务
//!
//! 消费心跳任务的 "本拍已采样" 信号, 每个信号驱动板载 LED 闪烁一次。
//! 纯视觉副作用, 尽力而为: 既不影响流水线, 也不向流水线回传失败。

use embassy_time::Timer;
use esp_hal::gpio::Output;

use crate::config::BLINK_PULSE;
use crate::tasks::heartbeat::SAMPLE_TICK;
use crate::util::log::*;

/// 板载 LED 闪烁任务
#[embassy_executor::task]
pub async fn indicator_task(mut led: Output<'static>) {
    log_info!("Indicator task started");

    loop {
        SAMPLE_TICK.wait().await;

        led.set_high();
        Timer::after(BLINK_PULSE).await;
        led.set_low();
    }
}

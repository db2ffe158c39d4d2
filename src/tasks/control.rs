//! 按钮控制路径: 中断延迟处理 + 频率档位推进
//!
//! 中断上下文禁止任何阻塞操作 (互斥锁获取、驱动调用), 因此拆成两段:
//! - [`button_interrupt_handler`]: 真正的 ISR, 只清除引脚中断标志并向
//!   有界事件队列投递一个零负载信号, 随即返回
//! - [`control_task`]: 普通任务上下文, 消费延迟信号, 推进频率寄存器,
//!   并把新档位显示到三位 LED 架上
//!
//! 事件队列容量为 2: 控制任务来不及消费时, 最多积压两次按压,
//! 更多的按压被静默丢弃 (中断风暴合并策略, 不是错误)。

use core::cell::RefCell;

use critical_section::Mutex;
use esp_hal::gpio::Input;
use esp_hal::{handler, ram};

use crate::drivers::RateStand;
use crate::sync::primitives::CriticalChannel;
use crate::tasks::heartbeat::RATE;
use crate::util::log::*;

// ===== 中断共享状态 =====

/// 按钮引脚, ISR 内仅用于清除中断标志
static BUTTON: Mutex<RefCell<Option<Input<'static>>>> = Mutex::new(RefCell::new(None));

/// 延迟按钮事件队列 (ISR 投递, 控制任务消费)
pub static BUTTON_EVENTS: CriticalChannel<(), 2> = CriticalChannel::new();

/// 注册按钮引脚, 必须在 `listen` 之后、任务启动之前调用一次
pub fn register_button(button: Input<'static>) {
    critical_section::with(|cs| {
        BUTTON.borrow_ref_mut(cs).replace(button);
    });
}

// ===== 中断处理函数 =====

/// 按钮 GPIO 中断处理函数
///
/// 只做两件事: 清中断标志、投递延迟信号。`try_send` 不阻塞,
/// 队列满时丢弃本次按压。
#[ram]
#[handler]
pub fn button_interrupt_handler() {
    critical_section::with(|cs| {
        if let Some(button) = BUTTON.borrow_ref_mut(cs).as_mut() {
            button.clear_interrupt();
        }
    });

    let _ = BUTTON_EVENTS.try_send(());
}

// ===== 控制任务 =====

/// 频率控制任务
///
/// Idle -> 收到延迟信号 -> 推进档位 -> 刷新 LED 架 -> Idle。
/// 寄存器锁只覆盖推进本身, 不跨越 LED 驱动调用。
#[embassy_executor::task]
pub async fn control_task(mut stand: RateStand<'static>) {
    log_info!("Control task started");

    loop {
        BUTTON_EVENTS.receive().await;

        let rate = RATE.advance();
        stand.display(rate);

        log_info!("Rate advanced to {}", rate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_events_coalesce_beyond_capacity() {
        // 队列容量为 2: 前两次按压排队, 第三次被丢弃 (中断风暴合并)
        assert!(BUTTON_EVENTS.try_send(()).is_ok());
        assert!(BUTTON_EVENTS.try_send(()).is_ok());
        assert!(BUTTON_EVENTS.try_send(()).is_err());

        // 恰好两个事件待处理, 不多也不少
        assert_eq!(BUTTON_EVENTS.try_receive(), Ok(()));
        assert_eq!(BUTTON_EVENTS.try_receive(), Ok(()));
        assert!(BUTTON_EVENTS.try_receive().is_err());
    }
}

//! 心跳任务 (采样节拍驱动)
//!
//! 系统唯一的节拍源。每一拍:
//! 1. 向两个采样任务各释放一个采样许可 (扇出, 两者可并发推进)
//! 2. 通知指示灯任务 "本拍已采样"
//! 3. 读取频率寄存器, 按 `BASE_DELAY / 2^(rate-1)` 计算本拍周期
//! 4. 挂起等待该周期 —— 全系统唯一的限速点
//!
//! 许可与采样通知均为 [`CriticalSignal`]: 对已置位信号再次置位只会
//! 合并 (饱和), 不会失败。接收方偶尔慢于节拍时, 丢失的是多余的一拍,
//! 属于已接受的节拍偏差。
//!
//! 启用 `closed-loop` feature 后, 心跳在睡眠之后还会等待融合任务的
//! cycle-complete 信号, 使吞吐率跟随处理时延而非壁钟。该变体假定
//! 传感器失败只是瞬态: 某拍读数缺失时, 配对要等到下一个许可补齐,
//! 而下一个许可又要等 cycle-complete, 流水线会停在未完成的读数对上。
//! 传感器可能永久失效的部署应使用默认的壁钟节拍。

use embassy_time::{Duration, Timer};

use crate::config::{BASE_DELAY_US, RATE_MAX, RATE_MIN};
use crate::sync::primitives::CriticalSignal;
use crate::sync::rate::RateScaler;
use crate::util::log::*;

// ===== 共享状态: 频率寄存器 =====
/// 全局频率档位, 心跳任务读, 控制任务写
pub static RATE: RateScaler = RateScaler::new();

// ===== 节拍信号 =====
/// 温度采样许可
pub static TEMP_PERMIT: CriticalSignal<()> = CriticalSignal::new();

/// 距离采样许可
pub static DIST_PERMIT: CriticalSignal<()> = CriticalSignal::new();

/// 本拍采样通知 (指示灯任务消费)
pub static SAMPLE_TICK: CriticalSignal<()> = CriticalSignal::new();

/// 融合周期完成信号 (仅 closed-loop 节拍使用)
#[cfg(feature = "closed-loop")]
pub static CYCLE_DONE: CriticalSignal<()> = CriticalSignal::new();

/// 由频率档位计算节拍周期
///
/// 指数映射: 档位每升 1, 周期减半。档位 1 对应基准周期 1s,
/// 档位 7 对应 1s/64 = 15.625ms。
#[inline]
pub fn tick_delay(rate: u8) -> Duration {
    let rate = rate.clamp(RATE_MIN, RATE_MAX);
    Duration::from_micros(BASE_DELAY_US >> (rate - 1))
}

// ===== 心跳任务 =====
/// 节拍驱动任务
///
/// 许可释放先于周期计算, 因此两个采样任务总在下一次寄存器读取前
/// 就已具备运行资格; 两者之间没有定义相对顺序。
#[embassy_executor::task]
pub async fn heartbeat_task() {
    log_info!("Heartbeat task started, base period {}us", BASE_DELAY_US);

    let mut tick: u64 = 0;

    loop {
        tick += 1;

        // 扇出采样许可 (饱和语义, 不会失败)
        TEMP_PERMIT.signal(());
        DIST_PERMIT.signal(());

        // 通知指示灯任务
        SAMPLE_TICK.signal(());

        // 按当前档位计算并等待本拍周期
        let rate = RATE.read();
        let delay = tick_delay(rate);
        log_trace!("Tick {}: rate={}, delay={}us", tick, rate, delay.as_micros());

        Timer::after(delay).await;

        // 闭环节拍: 下一拍由融合完成触发, 吞吐率跟随处理时延
        #[cfg(feature = "closed-loop")]
        CYCLE_DONE.wait().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_at_rate_bounds() {
        // 档位 1 = 基准周期, 档位 7 = 基准周期 / 64
        assert_eq!(tick_delay(1), Duration::from_micros(1_000_000));
        assert_eq!(tick_delay(7), Duration::from_micros(15_625));
    }

    #[test]
    fn test_delay_halves_per_step() {
        for r in RATE_MIN..RATE_MAX {
            assert_eq!(
                tick_delay(r).as_micros(),
                tick_delay(r + 1).as_micros() * 2
            );
        }
    }

    #[test]
    fn test_delay_scenario_after_advances() {
        // 从档位 1 出发: 1 次推进 -> 500ms, 6 次 -> 15.625ms, 7 次回绕 -> 1s
        let rate = RateScaler::new();
        assert_eq!(tick_delay(rate.read()), Duration::from_micros(1_000_000));

        let r = rate.advance();
        assert_eq!(tick_delay(r), Duration::from_micros(500_000));

        for _ in 0..5 {
            rate.advance();
        }
        assert_eq!(rate.read(), 7);
        assert_eq!(tick_delay(rate.read()), Duration::from_micros(15_625));

        let r = rate.advance();
        assert_eq!(r, 1);
        assert_eq!(tick_delay(r), Duration::from_micros(1_000_000));
    }

    #[test]
    fn test_delay_clamps_out_of_domain() {
        assert_eq!(tick_delay(0), tick_delay(1));
        assert_eq!(tick_delay(8), tick_delay(7));
    }
}

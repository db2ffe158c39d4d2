//! 采样频率寄存器
//!
//! 心跳任务周期性读取、控制任务在按钮中断后推进的共享频率档位。
//! 档位域为 [1, 7]，推进按循环规则 `next = (cur mod 7) + 1` 回绕。
//!
//! 使用 embassy-sync 的阻塞互斥锁而非异步互斥锁:
//! 临界区只包含一次寄存器读或写，持锁时间极短，无须让出执行权，
//! 读者也绝不会观察到撕裂的中间值。

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::config::{RATE_MAX, RATE_MIN};

/// 互斥保护的频率档位寄存器
///
/// # Example
/// ```ignore
/// static RATE: RateScaler = RateScaler::new();
///
/// let rate = RATE.read();        // 心跳任务
/// let next = RATE.advance();     // 控制任务 (唯一写者)
/// ```
pub struct RateScaler {
    inner: Mutex<CriticalSectionRawMutex, Cell<u8>>,
}

impl RateScaler {
    /// 创建寄存器, 初始档位为 [`RATE_MIN`]
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(Cell::new(RATE_MIN)),
        }
    }

    /// 读取当前档位
    ///
    /// 与并发写互斥, 返回值保证在 [RATE_MIN, RATE_MAX] 域内
    #[inline]
    pub fn read(&self) -> u8 {
        self.inner.lock(|cell| cell.get())
    }

    /// 循环推进档位并返回新值
    ///
    /// 唯一的写操作: `next = (cur mod RATE_MAX) + 1`，7 档之后回绕到 1 档。
    /// 域在该运算下封闭，不存在错误路径。
    #[inline]
    pub fn advance(&self) -> u8 {
        self.inner.lock(|cell| {
            let next = cell.get() % RATE_MAX + 1;
            cell.set(next);
            next
        })
    }
}

impl Default for RateScaler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_rate() {
        let rate = RateScaler::new();
        assert_eq!(rate.read(), RATE_MIN);
    }

    #[test]
    fn test_advance_law() {
        // 对每个档位 r, advance 得到 (r mod 7) + 1
        for r in RATE_MIN..=RATE_MAX {
            let rate = RateScaler::new();
            for _ in RATE_MIN..r {
                rate.advance();
            }
            assert_eq!(rate.read(), r);
            assert_eq!(rate.advance(), r % RATE_MAX + 1);
        }
    }

    #[test]
    fn test_advance_is_cyclic() {
        // 推进 7 次回到初值
        let rate = RateScaler::new();
        let initial = rate.read();
        for _ in 0..RATE_MAX {
            let r = rate.advance();
            assert!((RATE_MIN..=RATE_MAX).contains(&r));
        }
        assert_eq!(rate.read(), initial);
    }

    #[test]
    fn test_two_advances_move_two_steps() {
        // 两次按钮合并处理后, 档位恰好前进 2 步
        let rate = RateScaler::new();
        rate.advance();
        rate.advance();
        assert_eq!(rate.read(), 3);
    }
}

//! 同步原语封装
//!
//! 基于 embassy-sync 提供的同步原语，统一使用 CriticalSectionRawMutex
//! 以确保在 ESP32-S3 单核/双核环境下的正确性

use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    channel::Channel,
    mutex::Mutex,
    signal::Signal,
};

// ===== 类型别名: 简化使用 =====

/// 临界区信号量 - 用于任务间单值通知
///
/// 发送方可以发送一个值，接收方异步等待
/// 多次发送只保留最后一个值 (饱和语义, 天然合并突发信号)
///
/// # Example
/// ```ignore
/// static SIGNAL: CriticalSignal<()> = CriticalSignal::new();
///
/// // 发送方 (中断上下文安全)
/// SIGNAL.signal(());
///
/// // 接收方 (异步)
/// SIGNAL.wait().await;
/// ```
pub type CriticalSignal<T> = Signal<CriticalSectionRawMutex, T>;

/// 临界区通道 - 有界消息队列
///
/// 固定容量, 队列满时发送方异步阻塞 (背压而非丢弃)
///
/// # Type Parameters
/// * `T` - 消息类型
/// * `N` - 队列容量
///
/// # Example
/// ```ignore
/// static READINGS: CriticalChannel<f64, 1> = CriticalChannel::new();
///
/// // 发送方 (异步，上一个值未被取走时等待)
/// READINGS.send(22.5).await;
///
/// // 接收方 (异步)
/// let value = READINGS.receive().await;
/// ```
pub type CriticalChannel<T, const N: usize> = Channel<CriticalSectionRawMutex, T, N>;

/// 临界区互斥锁 - 异步互斥访问
///
/// 保护共享资源的异步访问
pub type CriticalMutex<T> = Mutex<CriticalSectionRawMutex, T>;

// ===== 便捷构造函数 =====

/// 创建新的信号量
#[inline]
pub const fn new_signal<T>() -> CriticalSignal<T> {
    Signal::new()
}

/// 创建新的通道
#[inline]
pub const fn new_channel<T, const N: usize>() -> CriticalChannel<T, N> {
    Channel::new()
}

// ===== 优化的原子操作封装 =====

use portable_atomic::{AtomicU64, Ordering};

/// 原子计数器 - 用于统计和序列号
pub struct AtomicCounter {
    count: AtomicU64,
}

impl AtomicCounter {
    /// 创建新的计数器
    pub const fn new() -> Self {
        Self {
            count: AtomicU64::new(0),
        }
    }

    /// 增加并返回新值
    #[inline(always)]
    pub fn increment(&self) -> u64 {
        self.count.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// 获取当前值
    #[inline(always)]
    pub fn get(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}

impl Default for AtomicCounter {
    fn default() -> Self {
        Self::new()
    }
}

//! 读数融合任务
//!
//! 从两个交接通道各取一个读数 (到达顺序无关, 两者齐备才继续),
//! 按位异或融合为单一值, 计算 SHA-256 摘要并连同原始读数一起上报。
//! 每个完整读数对恰好触发一次摘要计算, 不会出现半对融合。
//!
//! 若某个采样任务落后一拍, 容量为 1 的通道保证读数不被覆盖,
//! 代价是第 N 拍的读数可能与第 N+1 拍的读数配对 (已接受的偏差)。

use core::fmt::Write;

use heapless::String;
use sha2::{Digest, Sha256};

use crate::sync::primitives::AtomicCounter;
use crate::tasks::poll::{DIST_READINGS, TEMP_READINGS};
use crate::util::log::*;

#[cfg(feature = "closed-loop")]
use crate::tasks::heartbeat::CYCLE_DONE;

// ===== 统计 =====
/// 已完成的融合周期数
static FUSED_CYCLES: AtomicCounter = AtomicCounter::new();

/// 获取已完成的融合周期数
#[inline(always)]
pub fn fused_cycle_count() -> u64 {
    FUSED_CYCLES.get()
}

// ===== 融合与摘要 =====

/// 按位异或融合两个读数
///
/// 将两个 f64 的原始位型视作 u64 异或, 再把结果重新解释为 f64。
/// 有损且不可逆, 仅用于为摘要产生每拍唯一的输入。
#[inline]
pub fn fuse_readings(temperature: f64, distance: f64) -> f64 {
    f64::from_bits(temperature.to_bits() ^ distance.to_bits())
}

/// 计算融合值的 SHA-256 摘要 (小端字节序输入)
pub fn transform(fused: f64) -> [u8; 32] {
    let digest = Sha256::digest(fused.to_le_bytes());
    digest.into()
}

/// 摘要的十六进制表示 (上报用)
fn digest_hex(digest: &[u8; 32]) -> String<64> {
    let mut hex = String::new();
    for byte in digest {
        // 64 字节容量恰好容纳 32 字节摘要, write 不会失败
        let _ = write!(hex, "{:02x}", byte);
    }
    hex
}

// ===== 融合任务 =====
/// 读数配对 + 融合 + 摘要 + 上报
#[embassy_executor::task]
pub async fn fusion_task() {
    log_info!("Fusion task started");

    loop {
        // 屏障: 两个读数齐备之前不做任何融合
        let temperature = TEMP_READINGS.receive().await;
        let distance = DIST_READINGS.receive().await;

        let fused = fuse_readings(temperature, distance);
        let digest = transform(fused);
        let cycle = FUSED_CYCLES.increment();

        log_info!("SHA: {}", digest_hex(&digest).as_str());
        log_info!(
            "Temperature: {}C  Distance: {}m  (cycle {})",
            temperature,
            distance,
            cycle
        );

        // 闭环节拍: 处理完成后才放行下一拍
        #[cfg(feature = "closed-loop")]
        CYCLE_DONE.signal(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuse_is_bitwise_xor() {
        let temperature = 22.5_f64;
        let distance = 1.30_f64;
        let fused = fuse_readings(temperature, distance);
        assert_eq!(fused.to_bits(), temperature.to_bits() ^ distance.to_bits());
    }

    #[test]
    fn test_fuse_zero_is_identity() {
        // 0.0 的位型全零, 异或后保持另一读数不变
        let reading = 3.75_f64;
        assert_eq!(fuse_readings(reading, 0.0).to_bits(), reading.to_bits());
        assert_eq!(fuse_readings(0.0, reading).to_bits(), reading.to_bits());
    }

    #[test]
    fn test_fuse_equal_readings_cancel() {
        assert_eq!(fuse_readings(22.5, 22.5).to_bits(), 0);
    }

    #[test]
    fn test_transform_is_deterministic() {
        let fused = fuse_readings(22.5, 1.30);
        assert_eq!(transform(fused), transform(fused));
    }

    #[test]
    fn test_transform_differs_per_input() {
        let a = transform(fuse_readings(22.5, 1.30));
        let b = transform(fuse_readings(22.6, 1.30));
        assert_ne!(a, b);
    }

    #[test]
    fn test_digest_hex_format() {
        let hex = digest_hex(&[0xab; 32]);
        assert_eq!(hex.len(), 64);
        assert!(hex.as_str().chars().all(|c| c == 'a' || c == 'b'));

        let hex = digest_hex(&[0x01; 32]);
        assert_eq!(hex.len(), 64);
        assert!(hex.as_str().chars().all(|c| c == '0' || c == '1'));
    }
}

//! 三位 LED 档位显示架
//!
//! 红/黄/绿三个 LED 以二进制显示当前频率档位:
//! 红 = bit0, 黄 = bit1, 绿 = bit2。档位域 [1, 7] 恰好占满三位。

use esp_hal::gpio::Output;

/// 档位的三位二进制分解 (红, 黄, 绿)
#[inline]
pub fn rate_bits(rate: u8) -> (bool, bool, bool) {
    (
        rate & 0b001 != 0,
        rate & 0b010 != 0,
        rate & 0b100 != 0,
    )
}

/// 三位 LED 显示架
pub struct RateStand<'d> {
    red: Output<'d>,
    yellow: Output<'d>,
    green: Output<'d>,
}

impl<'d> RateStand<'d> {
    /// 创建显示架, 三个引脚应已配置为推挽输出
    pub fn new(red: Output<'d>, yellow: Output<'d>, green: Output<'d>) -> Self {
        Self { red, yellow, green }
    }

    /// 显示档位的二进制表示, 超出 3 位的值忽略
    pub fn display(&mut self, rate: u8) {
        if rate > 7 {
            return;
        }

        let (r, y, g) = rate_bits(rate);
        self.red.set_level(r.into());
        self.yellow.set_level(y.into());
        self.green.set_level(g.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_bits_decomposition() {
        assert_eq!(rate_bits(1), (true, false, false));
        assert_eq!(rate_bits(2), (false, true, false));
        assert_eq!(rate_bits(4), (false, false, true));
        assert_eq!(rate_bits(5), (true, false, true));
        assert_eq!(rate_bits(7), (true, true, true));
    }
}

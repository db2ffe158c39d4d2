//! BMP180 温度传感器驱动
//!
//! 气压测量不在使用范围内, 只实现温度路径:
//! 初始化时读出 AC5/AC6/MC/MD 四个标定系数, 每次采样启动一次
//! 温度转换 (0xF4 <- 0x2E), 等待转换完成后读出原始值并按
//! 数据手册的整数补偿流水线换算为 °C。
//!
//! 对 I2C 总线泛型 (`embedded_hal::i2c::I2c`), 转换等待用
//! embassy 定时器完成, 不忙等。

use embedded_hal::i2c::I2c;

use crate::config::BMP180_CONVERSION_DELAY;

// ===== BMP180 寄存器地址 =====

const BMP180_ADDR: u8 = 0x77;

const AC5_MSB_ADDR: u8 = 0xB2;
const AC6_MSB_ADDR: u8 = 0xB4;
const MC_MSB_ADDR: u8 = 0xBC;
const MD_MSB_ADDR: u8 = 0xBE;

const CTRL_MEAS_ADDR: u8 = 0xF4;
const MEAS_TEMP_CMD: u8 = 0x2E;
const MEAS_OUT_MSB_ADDR: u8 = 0xF6;

// ===== 错误类型 =====

/// BMP180 驱动错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bmp180Error {
    /// I2C 总线错误
    Bus,
    /// 标定系数不合法 (补偿除法分母为零)
    BadCalibration,
}

impl Bmp180Error {
    /// 日志友好的静态描述
    pub fn as_str(&self) -> &'static str {
        match self {
            Bmp180Error::Bus => "i2c bus error",
            Bmp180Error::BadCalibration => "bad calibration",
        }
    }
}

impl core::fmt::Display for Bmp180Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ===== 标定系数 =====

/// 温度补偿用的标定系数 (出厂写入 EEPROM)
#[derive(Debug, Clone, Copy)]
struct Coeffs {
    ac5: i16,
    ac6: i16,
    mc: i16,
    md: i16,
}

/// 数据手册的整数温度补偿流水线, 结果单位 °C
fn compensate(ut: i16, coeffs: &Coeffs) -> Result<f64, Bmp180Error> {
    let x1 = ((ut as i32 - coeffs.ac6 as i32) * coeffs.ac5 as i32) >> 15;

    let divisor = x1 + coeffs.md as i32;
    if divisor == 0 {
        return Err(Bmp180Error::BadCalibration);
    }
    let x2 = ((coeffs.mc as i32) << 11) / divisor;

    // b5 以 0.1°C 为单位
    Ok((((x1 + x2 + 8) >> 4) as f64) / 10.0)
}

// ===== 驱动 =====

/// BMP180 温度传感器
pub struct Bmp180<I2C> {
    i2c: I2C,
    coeffs: Coeffs,
}

impl<I2C: I2c> Bmp180<I2C> {
    /// 初始化驱动并读取标定系数
    ///
    /// 总线错误视为致命的启动失败, 由调用方决定是否继续
    pub fn new(mut i2c: I2C) -> Result<Self, Bmp180Error> {
        let coeffs = Coeffs {
            ac5: read_word(&mut i2c, AC5_MSB_ADDR)?,
            ac6: read_word(&mut i2c, AC6_MSB_ADDR)?,
            mc: read_word(&mut i2c, MC_MSB_ADDR)?,
            md: read_word(&mut i2c, MD_MSB_ADDR)?,
        };
        Ok(Self { i2c, coeffs })
    }

    /// 采样一次温度 (°C)
    ///
    /// 启动转换 -> 等待 5ms -> 读出原始值 -> 补偿
    pub async fn read_temperature(&mut self) -> Result<f64, Bmp180Error> {
        self.i2c
            .write(BMP180_ADDR, &[CTRL_MEAS_ADDR, MEAS_TEMP_CMD])
            .map_err(|_| Bmp180Error::Bus)?;

        embassy_time::Timer::after(BMP180_CONVERSION_DELAY).await;

        let ut = read_word(&mut self.i2c, MEAS_OUT_MSB_ADDR)?;
        compensate(ut, &self.coeffs)
    }
}

/// 读一个大端 16 位寄存器
fn read_word<I2C: I2c>(i2c: &mut I2C, address: u8) -> Result<i16, Bmp180Error> {
    let mut buffer = [0u8; 2];
    i2c.write_read(BMP180_ADDR, &[address], &mut buffer)
        .map_err(|_| Bmp180Error::Bus)?;
    Ok(((buffer[0] as i16) << 8) | buffer[1] as i16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compensate_datasheet_example() {
        // BMP180 数据手册 (BST-BMP180-DS000-09) 的算例: T = 15.0°C
        let coeffs = Coeffs {
            ac5: 32757,
            ac6: 23153,
            mc: -8711,
            md: 2868,
        };
        let t = compensate(27898, &coeffs).unwrap();
        assert_eq!(t, 15.0);
    }

    #[test]
    fn test_compensate_rejects_zero_divisor() {
        // x1 = 0 且 md = 0 时分母为零
        let coeffs = Coeffs {
            ac5: 0,
            ac6: 0,
            mc: -8711,
            md: 0,
        };
        assert_eq!(compensate(0, &coeffs), Err(Bmp180Error::BadCalibration));
    }
}

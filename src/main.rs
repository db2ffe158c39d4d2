//! SenseFuse - ESP32-S3 自适应双传感器采样流水线
//!
//! 基于 Embassy 异步运行时的任务编排:
//! - 心跳任务扇出采样许可并按频率档位节流
//! - 两个采样任务独立读取 BMP180 温度与 SR04 距离
//! - 融合任务配对读数、异或融合并计算 SHA-256 摘要
//! - BOOT 按钮中断经延迟信号驱动频率档位循环推进 (1~7)
//!
//! 硬件目标: ESP32-S3 (双核 Xtensa LX7 @ 240MHz)

#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use esp_hal::{
    gpio::{Event, Input, InputConfig, Io, Level, Output, OutputConfig, Pull},
    i2c::master::{Config as I2cConfig, I2c},
    interrupt::software::SoftwareInterruptControl,
    interrupt::Priority,
    time::Rate,
    timer::timg::TimerGroup,
};
use esp_rtos::embassy::InterruptExecutor;
use static_cell::StaticCell;

use sensefuse::drivers::{Bmp180, RateStand, Sr04};
use sensefuse::tasks;
use sensefuse::tasks::heartbeat::RATE;

// ===== ESP-IDF 兼容 App Descriptor (手动定义) =====
// 设置 min_efuse_blk_rev_full = 0 以支持所有芯片版本
#[repr(C)]
struct EspAppDesc {
    magic_word: u32,
    secure_version: u32,
    reserv1: [u32; 2],
    version: [u8; 32],
    project_name: [u8; 32],
    time: [u8; 16],
    date: [u8; 16],
    idf_ver: [u8; 32],
    app_elf_sha256: [u8; 32],
    min_efuse_blk_rev_full: u16,
    max_efuse_blk_rev_full: u16,
    mmu_page_size: u8,
    reserv3: [u8; 3],
    reserv2: [u32; 18],
}

#[link_section = ".flash.appdesc"]
#[used]
static ESP_APP_DESC: EspAppDesc = EspAppDesc {
    magic_word: 0xABCD5432,
    secure_version: 0,
    reserv1: [0; 2],
    version: *b"0.2.0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0",
    project_name: *b"sensefuse\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0",
    time: *b"00:00:00\0\0\0\0\0\0\0\0",
    date: *b"2025-01-01\0\0\0\0\0\0",
    idf_ver: *b"v5.0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0",
    app_elf_sha256: [0; 32],
    min_efuse_blk_rev_full: 0,
    max_efuse_blk_rev_full: u16::MAX,
    mmu_page_size: 16, // 64KB = 2^16
    reserv3: [0; 3],
    reserv2: [0; 18],
};

// ===== 条件编译日志 =====
#[allow(unused_imports)]
use sensefuse::util::log::*;

// ===== Panic Handler =====
#[cfg(feature = "dev")]
use esp_backtrace as _;

#[cfg(not(feature = "dev"))]
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    loop {
        core::hint::spin_loop();
    }
}

// ===== 静态分配 =====
/// 控制路径执行器 - 按键响应优先于流水线任务
static CONTROL_EXECUTOR: StaticCell<InterruptExecutor<1>> = StaticCell::new();

// ===== 主入口点 =====
#[esp_rtos::main]
async fn main(spawner: Spawner) {
    // ========================================
    // 1. 硬件初始化
    // ========================================
    let peripherals = esp_hal::init(esp_hal::Config::default());

    log_info!("SenseFuse starting on ESP32-S3");

    // ========================================
    // 2. GPIO 初始化
    // ========================================
    let mut io = Io::new(peripherals.IO_MUX);
    io.set_interrupt_handler(tasks::control::button_interrupt_handler);

    // 板载指示 LED
    let blink_led = Output::new(peripherals.GPIO35, Level::Low, OutputConfig::default());

    // 三位档位显示架 (红/黄/绿)
    let mut stand = RateStand::new(
        Output::new(peripherals.GPIO21, Level::Low, OutputConfig::default()),
        Output::new(peripherals.GPIO26, Level::Low, OutputConfig::default()),
        Output::new(peripherals.GPIO48, Level::Low, OutputConfig::default()),
    );

    // SR04: 触发 + 回波
    let sr04 = Sr04::new(
        Output::new(peripherals.GPIO5, Level::Low, OutputConfig::default()),
        Input::new(peripherals.GPIO4, InputConfig::default().with_pull(Pull::Down)),
    );

    // ========================================
    // 3. I2C 初始化 (BMP180)
    // ========================================
    let i2c_config = I2cConfig::default().with_frequency(Rate::from_khz(100));
    let i2c = match I2c::new(peripherals.I2C0, i2c_config) {
        Ok(i2c) => i2c.with_sda(peripherals.GPIO7).with_scl(peripherals.GPIO6),
        Err(_) => {
            // 同步原语/外设分配失败属于致命启动错误, 不启动任何任务
            log_error!("FATAL: I2C peripheral init failed");
            park()
        }
    };

    let bmp180 = match Bmp180::new(i2c) {
        Ok(sensor) => sensor,
        Err(e) => {
            log_error!("FATAL: BMP180 init failed ({})", e.as_str());
            park()
        }
    };

    // ========================================
    // 4. 按钮中断 (BOOT 键, 下降沿)
    // ========================================
    let mut button = Input::new(peripherals.GPIO0, InputConfig::default().with_pull(Pull::Up));
    button.listen(Event::FallingEdge);
    tasks::control::register_button(button);

    // 任务启动前显示初始档位
    stand.display(RATE.read());

    // ========================================
    // 5. 初始化 esp-rtos (Embassy 时间驱动)
    // ========================================
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let sw_ints = SoftwareInterruptControl::new(peripherals.SW_INTERRUPT);
    esp_rtos::start(timg0.timer0, sw_ints.software_interrupt0);

    log_info!("Embassy initialized");

    // ========================================
    // 6. 控制任务 (中断执行器, Priority3)
    // ========================================
    let control_executor = CONTROL_EXECUTOR.init(InterruptExecutor::new(sw_ints.software_interrupt1));
    let control_spawner = control_executor.start(Priority::Priority3);
    control_spawner.must_spawn(tasks::control::control_task(stand));

    // ========================================
    // 7. 流水线任务 (主执行器)
    // ========================================
    spawner.must_spawn(tasks::heartbeat::heartbeat_task());
    spawner.must_spawn(tasks::poll::poll_temperature_task(bmp180));
    spawner.must_spawn(tasks::poll::poll_distance_task(sr04));
    spawner.must_spawn(tasks::fusion::fusion_task());
    spawner.must_spawn(tasks::indicator::indicator_task(blink_led));

    log_info!("All tasks spawned, entering main loop");

    // ========================================
    // 8. 主循环 - 系统监控
    // ========================================
    loop {
        Timer::after(Duration::from_secs(10)).await;
        log_info!(
            "System heartbeat: rate={}, fused cycles={}",
            RATE.read(),
            tasks::fusion::fused_cycle_count()
        );
    }
}

/// 致命启动错误后停机 (不进入流水线)
fn park() -> ! {
    loop {
        core::hint::spin_loop();
    }
}

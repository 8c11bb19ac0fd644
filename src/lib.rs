#![cfg_attr(not(test), no_std)]

//! Late board init for the StreamIt MLB400 (RK3368).
//!
//! Runs once from U-Boot's `board_late_init` hook: picks up the factory MAC
//! address from the RESERVED1 partition and checks the recovery key, switching
//! `preboot` to rockusb when the key is held.

mod log;

pub mod board;
pub mod env;
pub mod key;
pub mod late_init;
pub mod mac;
pub mod provision;
pub mod regs;
pub mod storage;
#[cfg(all(feature = "uboot", not(test)))]
pub mod uboot;

#[cfg(all(feature = "panic-halt", not(feature = "defmt"), not(test)))]
use panic_halt as _;

#[cfg(test)]
mod testing;

// global logger
#[cfg(feature = "defmt")]
pub mod feature_defmt {
    use core::sync::atomic;

    pub use {defmt_rtt as _, panic_probe as _};

    static COUNT: atomic::AtomicUsize = atomic::AtomicUsize::new(0);
    defmt::timestamp!(
        "{=usize}",
        COUNT.fetch_add(1, atomic::Ordering::Relaxed)
    );
}

/// SARADC register block. Data, status and control sit at +0, +4 and +8.
pub const SARADC_BASE: usize = 0xFF10_0000;
pub const SARADC_DATA: usize = 0x0;
pub const SARADC_STAS: usize = 0x4;
pub const SARADC_CTRL: usize = 0x8;

/// SARADC channel wired to the recovery key, per SoC variant.
pub const RECOVERY_KEY_ADC_CHANNEL: u32 = if cfg!(feature = "rk3126") {
    2
} else if cfg!(feature = "rk322xh") {
    0
} else {
    1
};

/// Raw ADC window (inclusive) that reads as "recovery key held".
pub const RECOVERY_KEY_ADC_LOW: u32 = 0;
pub const RECOVERY_KEY_ADC_HIGH: u32 = 30;

/// First block of the RESERVED1 partition on eMMC, where the factory MAC lives.
pub const RESERVED1_MAC_BLOCK: u64 = 8064;
/// Arbitrary header bytes marking a programmed MAC record.
pub const MAC_RECORD_MAGIC: [u8; 2] = [0x20, 0x17];

/// Pre-boot command used when the recovery key is held. Clears itself so only
/// the next boot attempt lands in rockusb.
pub const PREBOOT_RECOVERY_CMD: &str = "setenv preboot; rockusb 0 mmc 0";

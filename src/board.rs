//! Per-board configuration.
//!
//! The MLB400 variants share the SoC and the recovery key wiring; they differ
//! in whether a factory MAC record exists and in the SPL boot order.

use crate::key::{AdcKey, AdcRegs, KeySource};
use crate::provision::MacRecordLocation;
use crate::{
    MAC_RECORD_MAGIC, RECOVERY_KEY_ADC_CHANNEL, RECOVERY_KEY_ADC_HIGH,
    RECOVERY_KEY_ADC_LOW, RESERVED1_MAC_BLOCK, SARADC_BASE, SARADC_CTRL,
    SARADC_DATA, SARADC_STAS,
};

/// U-Boot `BOOT_DEVICE_NONE`, terminates an SPL boot list.
pub const BOOT_DEVICE_NONE: u32 = 16;
/// Entries in U-Boot's `spl_boot_list`.
pub const SPL_BOOT_LIST_LEN: usize = 5;

/// Device the SPL may load the next stage from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BootDevice {
    Emmc,
    SdCard,
    SpiFlash,
}

impl BootDevice {
    /// U-Boot `BOOT_DEVICE_*` id.
    pub const fn spl_id(self) -> u32 {
        match self {
            BootDevice::Emmc => 1,     // BOOT_DEVICE_MMC1
            BootDevice::SdCard => 2,   // BOOT_DEVICE_MMC2
            BootDevice::SpiFlash => 8, // BOOT_DEVICE_SPI
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            BootDevice::Emmc => "emmc",
            BootDevice::SdCard => "sdcard",
            BootDevice::SpiFlash => "spi-flash",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardConfig {
    pub name: &'static str,
    pub recovery_key: KeySource,
    /// `None` on boards without a factory MAC record.
    pub mac_record: Option<MacRecordLocation>,
    pub boot_order: &'static [BootDevice],
}

impl BoardConfig {
    /// Fills an SPL boot list in priority order, padding the remainder with
    /// `BOOT_DEVICE_NONE`. Returns the number of devices written.
    pub fn fill_boot_order(&self, list: &mut [u32]) -> usize {
        list.fill(BOOT_DEVICE_NONE);
        let mut written = 0;
        for (slot, dev) in list.iter_mut().zip(self.boot_order) {
            *slot = dev.spl_id();
            written += 1;
        }
        written
    }
}

pub const RECOVERY_KEY: KeySource = KeySource::Analog(AdcKey {
    channel: RECOVERY_KEY_ADC_CHANNEL,
    low: RECOVERY_KEY_ADC_LOW,
    high: RECOVERY_KEY_ADC_HIGH,
    regs: AdcRegs {
        base: SARADC_BASE,
        data: SARADC_DATA,
        status: SARADC_STAS,
        ctrl: SARADC_CTRL,
    },
});

pub const MLB400_MAC_RECORD: MacRecordLocation = MacRecordLocation {
    interface: "mmc",
    dev: 0,
    block: RESERVED1_MAC_BLOCK,
    magic: MAC_RECORD_MAGIC,
};

/// Production board: boots from eMMC, factory MAC in RESERVED1.
pub const MLB400: BoardConfig = BoardConfig {
    name: "streamit-mlb400",
    recovery_key: RECOVERY_KEY,
    mac_record: Some(MLB400_MAC_RECORD),
    boot_order: &[BootDevice::Emmc, BootDevice::SdCard],
};

/// Development variant: SD card first, no MAC record.
pub const MLB400_SD: BoardConfig = BoardConfig {
    name: "streamit-mlb400-sd",
    recovery_key: RECOVERY_KEY,
    mac_record: None,
    boot_order: &[BootDevice::SdCard, BootDevice::Emmc],
};

/// Board selected at build time.
pub const BOARD: &BoardConfig = if cfg!(feature = "board-mlb400-sd") {
    &MLB400_SD
} else {
    &MLB400
};

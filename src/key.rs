//! Recovery key sampling.
//!
//! The key's signal path depends on the board revision: most boards put it on
//! a resistor ladder read through the shared SARADC, some on a plain GPIO.
//! [`KeySource`] covers both, and [`RecoveryKey`] owns the one the board uses.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::ErrorKind;

use crate::board::BoardConfig;
use crate::log::warn;
use crate::regs::RegisterIo;

/// Conversions per decision.
pub const ADC_SAMPLES: u32 = 10;
/// Hits needed above this count for the key to read as pressed (9 of 10).
pub const ADC_PRESS_THRESHOLD: u32 = 8;
/// Upper bound on end-of-conversion polls for a single sample.
pub const ADC_POLL_LIMIT: u32 = 10_000;

const ADC_SETTLE_US: u32 = 5;
const ADC_CTRL_START: u32 = 0x0028;
const ADC_CTRL_EOC: u32 = 0x40;

/// Hardware the key path touches.
pub trait KeyHardware: DelayNs {
    type Regs: RegisterIo;

    /// Register window of the peripheral at `base`.
    fn registers(&mut self, base: usize) -> Self::Regs;

    /// Logic level of a GPIO line.
    fn gpio_level(&mut self, line: u32) -> Result<bool, ErrorKind>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyError {
    /// The ADC never raised end-of-conversion.
    Timeout { channel: u32 },
    Gpio { line: u32, kind: ErrorKind },
}

impl core::fmt::Display for KeyError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            KeyError::Timeout { channel } => {
                write!(f, "ADC channel {channel} conversion timed out")
            }
            KeyError::Gpio { line, kind } => {
                write!(f, "GPIO {line} read failed: {kind:?}")
            }
        }
    }
}

impl core::error::Error for KeyError {}

/// Register layout of a SARADC instance, as offsets from `base`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdcRegs {
    pub base: usize,
    pub data: usize,
    /// Not touched by the sampling sequence.
    pub status: usize,
    pub ctrl: usize,
}

/// Key on a SARADC channel, pressed while the reading sits in `[low, high]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdcKey {
    pub channel: u32,
    pub low: u32,
    pub high: u32,
    pub regs: AdcRegs,
}

impl AdcKey {
    fn in_range(&self, value: u32) -> bool {
        (self.low..=self.high).contains(&value)
    }

    /// Takes [`ADC_SAMPLES`] conversions and reports pressed when more than
    /// [`ADC_PRESS_THRESHOLD`] of them land in range.
    ///
    /// The control register is left at 0 on every exit path.
    pub fn sample<H: KeyHardware>(&self, hw: &mut H) -> Result<bool, KeyError> {
        let mut regs = hw.registers(self.regs.base);
        let mut hits = 0;

        for _ in 0..ADC_SAMPLES {
            regs.write32(self.regs.ctrl, 0);
            hw.delay_us(ADC_SETTLE_US);
            regs.write32(self.regs.ctrl, ADC_CTRL_START | self.channel);
            hw.delay_us(ADC_SETTLE_US);

            if !self.wait_conversion(&mut regs) {
                regs.write32(self.regs.ctrl, 0);
                return Err(KeyError::Timeout {
                    channel: self.channel,
                });
            }

            let value = regs.read32(self.regs.data);
            if self.in_range(value) {
                hits += 1;
            }
        }
        regs.write32(self.regs.ctrl, 0);

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "adc key ch{}: {}/{} in range",
            self.channel,
            hits,
            ADC_SAMPLES
        );

        Ok(hits > ADC_PRESS_THRESHOLD)
    }

    fn wait_conversion<R: RegisterIo>(&self, regs: &mut R) -> bool {
        (0..ADC_POLL_LIMIT).any(|_| regs.read32(self.regs.ctrl) & ADC_CTRL_EOC != 0)
    }
}

/// Key on a GPIO line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioKey {
    pub name: &'static str,
    pub line: u32,
    /// Polarity: 0 is active-low, anything else active-high.
    pub pressed_state: u32,
    /// Reserved for long-press detection; not read at late init.
    pub press_time: u32,
}

impl GpioKey {
    pub const fn active_low(name: &'static str, line: u32) -> Self {
        GpioKey {
            name,
            line,
            pressed_state: 0,
            press_time: 0,
        }
    }

    pub const fn active_high(name: &'static str, line: u32) -> Self {
        GpioKey {
            name,
            line,
            pressed_state: 1,
            press_time: 0,
        }
    }

    pub fn sample<H: KeyHardware>(&self, hw: &mut H) -> Result<bool, KeyError> {
        let level = hw.gpio_level(self.line).map_err(|kind| KeyError::Gpio {
            line: self.line,
            kind,
        })?;

        if self.pressed_state == 0 {
            Ok(!level)
        } else {
            Ok(level)
        }
    }
}

/// Where a key's state comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeySource {
    #[default]
    None,
    Analog(AdcKey),
    Digital(GpioKey),
    /// IR remote key. Only decoded once the remote driver is up, so it never
    /// reads as pressed here.
    Remote,
}

impl KeySource {
    pub fn sample<H: KeyHardware>(&self, hw: &mut H) -> Result<bool, KeyError> {
        match self {
            KeySource::Analog(adc) => adc.sample(hw),
            KeySource::Digital(gpio) => gpio.sample(hw),
            KeySource::None | KeySource::Remote => Ok(false),
        }
    }
}

/// The board's recovery key.
#[derive(Debug, Default)]
pub struct RecoveryKey {
    source: KeySource,
}

impl RecoveryKey {
    /// An unconfigured key, which never reads as pressed.
    pub const fn new() -> Self {
        RecoveryKey {
            source: KeySource::None,
        }
    }

    /// Resets the key and installs the board's wiring.
    pub fn init(&mut self, board: &BoardConfig) {
        *self = Self::new();
        self.source = board.recovery_key;
    }

    pub fn source(&self) -> &KeySource {
        &self.source
    }

    /// True only when the key is positively detected; sampling errors read as
    /// released.
    pub fn is_pressed<H: KeyHardware>(&self, hw: &mut H) -> bool {
        match self.source.sample(hw) {
            Ok(pressed) => pressed,
            Err(err) => {
                warn!("recovery key: {}", err);
                false
            }
        }
    }
}

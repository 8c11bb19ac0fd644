//! U-Boot environment variables touched by late init.

/// MAC address consumed by the network drivers.
pub const ETHADDR: &str = "ethaddr";
/// Command run once before autoboot.
pub const PREBOOT: &str = "preboot";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EnvError {
    /// Name or value does not fit the C string buffer.
    TooLong,
    /// The environment returned a nonzero status.
    Rejected { code: i32 },
}

impl core::fmt::Display for EnvError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EnvError::TooLong => write!(f, "variable too long"),
            EnvError::Rejected { code } => write!(f, "env_set failed ({code})"),
        }
    }
}

impl core::error::Error for EnvError {}

pub trait Environment {
    fn set(&mut self, name: &str, value: &str) -> Result<(), EnvError>;
}

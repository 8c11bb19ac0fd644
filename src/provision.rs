//! Factory MAC address provisioning.
//!
//! The factory writes a small record to the first block of the RESERVED1
//! partition: two magic bytes followed by the six address bytes. Unprogrammed
//! boards simply lack the magic, in which case `ethaddr` is left alone and the
//! network driver falls back to its own default.

use crate::env::{ETHADDR, EnvError, Environment};
use crate::log::{info, warn};
use crate::mac::MacAddress;
use crate::storage::{BLOCK_SIZE, BlockDevice, BlockStorage};

/// Where a board keeps its MAC record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacRecordLocation {
    pub interface: &'static str,
    pub dev: u32,
    /// Absolute block index on the device.
    pub block: u64,
    pub magic: [u8; 2],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProvisionError {
    DeviceUnavailable,
    ReadFailed,
    /// The block does not start with the record magic.
    NoRecord { header: [u8; 2] },
    InvalidAddress(MacAddress),
    EnvWrite(EnvError),
}

impl core::fmt::Display for ProvisionError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ProvisionError::DeviceUnavailable => write!(f, "could not access storage device"),
            ProvisionError::ReadFailed => write!(f, "could not read MAC record block"),
            ProvisionError::NoRecord { header } => write!(
                f,
                "no MAC record on reserved partition (header {:#04x} {:#04x})",
                header[0], header[1]
            ),
            ProvisionError::InvalidAddress(mac) => write!(f, "invalid MAC address {mac}"),
            ProvisionError::EnvWrite(err) => write!(f, "could not set {ETHADDR}: {err}"),
        }
    }
}

impl core::error::Error for ProvisionError {}

/// Extracts the address from a record block.
pub fn parse_record(block: &[u8; BLOCK_SIZE], magic: [u8; 2]) -> Result<MacAddress, ProvisionError> {
    let header = [block[0], block[1]];
    if header != magic {
        return Err(ProvisionError::NoRecord { header });
    }

    let mut octets = [0u8; 6];
    octets.copy_from_slice(&block[2..8]);
    let mac = MacAddress(octets);
    if !mac.is_valid_unicast() {
        return Err(ProvisionError::InvalidAddress(mac));
    }
    Ok(mac)
}

/// Reads the board's MAC record and publishes it as `ethaddr`.
///
/// The environment is written only when every check passes.
pub fn provision<S, E>(
    storage: &mut S,
    env: &mut E,
    location: &MacRecordLocation,
) -> Result<MacAddress, ProvisionError>
where
    S: BlockStorage,
    E: Environment,
{
    let Some(mut dev) = storage.block_device(location.interface, location.dev) else {
        warn!("mac: Could not access {} device", location.interface);
        return Err(ProvisionError::DeviceUnavailable);
    };

    let mut block = [0u8; BLOCK_SIZE];
    if !matches!(dev.read_blocks(location.block, &mut block), Ok(1)) {
        warn!("mac: Could not read from {} device", location.interface);
        return Err(ProvisionError::ReadFailed);
    }

    let mac = match parse_record(&block, location.magic) {
        Ok(mac) => mac,
        Err(ProvisionError::NoRecord { header }) => {
            info!("mac: Did not find eth mac address on RESERVED1 partition");
            info!("Header: {} {}", header[0], header[1]);
            return Err(ProvisionError::NoRecord { header });
        }
        Err(err) => {
            warn!("mac: Invalid mac address loaded from {}", location.interface);
            return Err(err);
        }
    };

    let value = mac.to_env_string();
    if let Err(err) = env.set(ETHADDR, &value) {
        warn!("mac: Could not set {}: {}", ETHADDR, err);
        return Err(ProvisionError::EnvWrite(err));
    }
    info!("Using mac address: {}", value.as_str());

    Ok(mac)
}

//! Block storage as seen from late init.

/// Block size of the eMMC user area.
pub const BLOCK_SIZE: usize = 512;

pub trait BlockDevice {
    type Error;

    /// Reads `buf.len() / BLOCK_SIZE` blocks starting at `start` into `buf`,
    /// returning how many blocks were actually read.
    fn read_blocks(&mut self, start: u64, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

/// Lookup of block devices by interface name ("mmc", "usb", ...) and number.
pub trait BlockStorage {
    type Device: BlockDevice;

    fn block_device(&mut self, interface: &str, dev: u32) -> Option<Self::Device>;
}

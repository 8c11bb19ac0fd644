//! 32-bit register access at an offset from a peripheral base.

/// Access to one peripheral's register window.
pub trait RegisterIo {
    fn read32(&mut self, offset: usize) -> u32;
    fn write32(&mut self, offset: usize, value: u32);
}

impl<T: RegisterIo + ?Sized> RegisterIo for &mut T {
    fn read32(&mut self, offset: usize) -> u32 {
        (**self).read32(offset)
    }

    fn write32(&mut self, offset: usize, value: u32) {
        (**self).write32(offset, value)
    }
}

/// Memory-mapped register window backed by volatile loads and stores.
#[derive(Debug)]
pub struct Mmio {
    base: usize,
}

impl Mmio {
    /// # Safety
    ///
    /// `base` must be the address of a mapped peripheral whose registers are
    /// 32-bit aligned and safe to access with volatile loads and stores, and
    /// nothing else may drive that peripheral while this window is alive.
    pub const unsafe fn new(base: usize) -> Self {
        Mmio { base }
    }

    pub const fn base(&self) -> usize {
        self.base
    }

    fn reg(&self, offset: usize) -> *mut u32 {
        (self.base + offset) as *mut u32
    }
}

impl RegisterIo for Mmio {
    fn read32(&mut self, offset: usize) -> u32 {
        // Safety: guaranteed by the contract of `Mmio::new`.
        unsafe { self.reg(offset).read_volatile() }
    }

    fn write32(&mut self, offset: usize, value: u32) {
        // Safety: guaranteed by the contract of `Mmio::new`.
        unsafe { self.reg(offset).write_volatile(value) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mmio_reads_and_writes_at_offset() {
        let mut block = [0u32; 4];
        let base = block.as_mut_ptr() as usize;
        let mut regs = unsafe { Mmio::new(base) };

        regs.write32(8, 0x29);
        assert_eq!(regs.read32(8), 0x29);
        assert_eq!(regs.base(), base);
        drop(regs);
        assert_eq!(block, [0, 0, 0x29, 0]);
    }
}

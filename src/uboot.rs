//! Bindings to U-Boot and the exported board hooks.
//!
//! Built into the board object with `--features uboot`; U-Boot's
//! `board_late_init` calls [`rk_board_late_init`] and the SPL calls
//! [`board_boot_order`].

use core::ffi::{CStr, c_char, c_int, c_uint, c_ulong, c_void};
use core::fmt;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::ErrorKind;

use crate::board::{BOARD, SPL_BOOT_LIST_LEN};
use crate::env::{EnvError, Environment};
use crate::key::KeyHardware;
use crate::late_init::board_late_init;
use crate::regs::Mmio;
use crate::storage::{BLOCK_SIZE, BlockDevice, BlockStorage};

/// Longest variable name or value passed to `env_set`.
const ENV_CSTR_MAX: usize = 64;

/// `struct blk_desc`, only ever handled by pointer.
#[repr(C)]
pub struct BlkDesc {
    _private: [u8; 0],
}

unsafe extern "C" {
    fn blk_get_dev(ifname: *const c_char, dev: c_int) -> *mut BlkDesc;
    fn blk_dread(desc: *mut BlkDesc, start: c_ulong, blkcnt: c_ulong, buffer: *mut c_void) -> c_ulong;
    fn env_set(varname: *const c_char, value: *const c_char) -> c_int;
    fn gpio_get_value(gpio: c_uint) -> c_int;
    fn udelay(usec: c_ulong);
    fn putc(c: c_char);
}

/// U-Boot's stdout, normally the serial console.
struct Console;

impl fmt::Write for Console {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for &b in s.as_bytes() {
            // Safety: putc takes a plain byte and is usable once the console is up,
            // which it is by board_late_init.
            unsafe { putc(b as c_char) }
        }
        Ok(())
    }
}

/// Prints one diagnostic line on the console.
pub(crate) fn console_line(args: fmt::Arguments<'_>) {
    // Console writes cannot fail.
    let _ = crate::log::write_line(&mut Console, args);
}

fn delay_us(us: u32) {
    // Safety: udelay only spins on the arch timer.
    unsafe { udelay(us as c_ulong) }
}

/// Copies `s` into `buf` with a trailing NUL.
fn to_cstr<'a>(s: &str, buf: &'a mut [u8; ENV_CSTR_MAX]) -> Result<&'a CStr, EnvError> {
    let bytes = s.as_bytes();
    if bytes.len() >= buf.len() {
        return Err(EnvError::TooLong);
    }
    buf[..bytes.len()].copy_from_slice(bytes);
    buf[bytes.len()] = 0;
    CStr::from_bytes_until_nul(&buf[..=bytes.len()]).map_err(|_| EnvError::TooLong)
}

pub struct UbootBlockDevice {
    desc: *mut BlkDesc,
}

impl BlockDevice for UbootBlockDevice {
    type Error = ();

    fn read_blocks(&mut self, start: u64, buf: &mut [u8]) -> Result<usize, ()> {
        let count = buf.len() / BLOCK_SIZE;
        // Safety: `desc` came from `blk_get_dev` and `buf` holds `count` blocks.
        let read = unsafe {
            blk_dread(self.desc, start as c_ulong, count as c_ulong, buf.as_mut_ptr().cast())
        };
        Ok(read as usize)
    }
}

pub struct UbootStorage;

impl BlockStorage for UbootStorage {
    type Device = UbootBlockDevice;

    fn block_device(&mut self, interface: &str, dev: u32) -> Option<UbootBlockDevice> {
        let mut buf = [0u8; ENV_CSTR_MAX];
        let ifname = to_cstr(interface, &mut buf).ok()?;
        // Safety: `ifname` is NUL-terminated and outlives the call.
        let desc = unsafe { blk_get_dev(ifname.as_ptr(), dev as c_int) };
        if desc.is_null() {
            None
        } else {
            Some(UbootBlockDevice { desc })
        }
    }
}

pub struct UbootEnv;

impl Environment for UbootEnv {
    fn set(&mut self, name: &str, value: &str) -> Result<(), EnvError> {
        let mut name_buf = [0u8; ENV_CSTR_MAX];
        let mut value_buf = [0u8; ENV_CSTR_MAX];
        let name = to_cstr(name, &mut name_buf)?;
        let value = to_cstr(value, &mut value_buf)?;
        // Safety: both strings are NUL-terminated; env_set copies them.
        match unsafe { env_set(name.as_ptr(), value.as_ptr()) } {
            0 => Ok(()),
            code => Err(EnvError::Rejected { code }),
        }
    }
}

pub struct UbootKeys;

impl DelayNs for UbootKeys {
    fn delay_ns(&mut self, ns: u32) {
        delay_us(ns.div_ceil(1000))
    }

    fn delay_us(&mut self, us: u32) {
        delay_us(us)
    }
}

impl KeyHardware for UbootKeys {
    type Regs = Mmio;

    fn registers(&mut self, base: usize) -> Mmio {
        // Safety: key bases come from the board table and name the SARADC,
        // which nothing else touches during late init.
        unsafe { Mmio::new(base) }
    }

    fn gpio_level(&mut self, line: u32) -> Result<bool, ErrorKind> {
        // Safety: plain call into the GPIO uclass.
        match unsafe { gpio_get_value(line as c_uint) } {
            level if level < 0 => Err(ErrorKind::Other),
            level => Ok(level != 0),
        }
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn rk_board_late_init() -> c_int {
    board_late_init(BOARD, &mut UbootStorage, &mut UbootEnv, &mut UbootKeys)
}

/// SPL hook filling `spl_boot_list` from the board's boot order.
///
/// # Safety
///
/// `spl_boot_list` must point at U-Boot's boot list array.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn board_boot_order(spl_boot_list: *mut u32) {
    // Safety: the SPL passes its `SPL_BOOT_LIST_LEN`-entry array.
    let list = unsafe { core::slice::from_raw_parts_mut(spl_boot_list, SPL_BOOT_LIST_LEN) };
    BOARD.fill_boot_order(list);
}

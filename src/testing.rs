//! In-memory stand-ins for the U-Boot collaborators.

use std::cell::{RefCell, RefMut};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::string::{String, ToString};
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::ErrorKind;

use crate::env::{EnvError, Environment};
use crate::key::KeyHardware;
use crate::regs::RegisterIo;
use crate::storage::{BLOCK_SIZE, BlockDevice, BlockStorage};
use crate::{SARADC_CTRL, SARADC_DATA};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdcOp {
    Read { offset: usize },
    Write { offset: usize, value: u32 },
}

#[derive(Debug, Default)]
pub struct AdcState {
    pub readings: VecDeque<u32>,
    /// Busy polls before end-of-conversion shows up.
    pub polls_until_done: u32,
    pub stuck: bool,
    pub ops: Vec<AdcOp>,
    polls: u32,
}

/// SARADC that replays scripted conversion results.
#[derive(Debug, Clone, Default)]
pub struct FakeAdc(Rc<RefCell<AdcState>>);

impl FakeAdc {
    pub fn state(&self) -> RefMut<'_, AdcState> {
        self.0.borrow_mut()
    }
}

impl RegisterIo for FakeAdc {
    fn read32(&mut self, offset: usize) -> u32 {
        let mut s = self.0.borrow_mut();
        s.ops.push(AdcOp::Read { offset });
        match offset {
            SARADC_CTRL => {
                s.polls += 1;
                if !s.stuck && s.polls > s.polls_until_done {
                    0x40
                } else {
                    0
                }
            }
            SARADC_DATA => s
                .readings
                .pop_front()
                .expect("conversion read past scripted readings"),
            _ => 0,
        }
    }

    fn write32(&mut self, offset: usize, value: u32) {
        let mut s = self.0.borrow_mut();
        s.ops.push(AdcOp::Write { offset, value });
        if offset == SARADC_CTRL {
            s.polls = 0;
        }
    }
}

#[derive(Debug, Default)]
pub struct FakeHardware {
    pub adc: FakeAdc,
    /// Bases handed to `registers`, in order.
    pub mapped: Vec<usize>,
    pub gpio: HashMap<u32, Result<bool, ErrorKind>>,
    pub delay_ns: u64,
}

impl FakeHardware {
    pub fn with_readings(readings: &[u32]) -> Self {
        let hw = FakeHardware::default();
        hw.adc.state().readings.extend(readings.iter().copied());
        hw
    }
}

impl DelayNs for FakeHardware {
    fn delay_ns(&mut self, ns: u32) {
        self.delay_ns += u64::from(ns);
    }
}

impl KeyHardware for FakeHardware {
    type Regs = FakeAdc;

    fn registers(&mut self, base: usize) -> FakeAdc {
        self.mapped.push(base);
        self.adc.clone()
    }

    fn gpio_level(&mut self, line: u32) -> Result<bool, ErrorKind> {
        self.gpio.get(&line).copied().unwrap_or(Err(ErrorKind::Other))
    }
}

#[derive(Debug, Default)]
pub struct FakeEnv {
    pub vars: HashMap<String, String>,
    pub refuse: bool,
    pub writes: usize,
}

impl FakeEnv {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }
}

impl Environment for FakeEnv {
    fn set(&mut self, name: &str, value: &str) -> Result<(), EnvError> {
        if self.refuse {
            return Err(EnvError::Rejected { code: -1 });
        }
        self.writes += 1;
        self.vars.insert(name.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct DiskState {
    pub blocks: HashMap<u64, [u8; BLOCK_SIZE]>,
    pub fail_reads: bool,
    pub short_reads: bool,
    pub reads: Vec<(u64, usize)>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeDisk(Rc<RefCell<DiskState>>);

impl FakeDisk {
    pub fn state(&self) -> RefMut<'_, DiskState> {
        self.0.borrow_mut()
    }
}

impl BlockDevice for FakeDisk {
    type Error = ();

    fn read_blocks(&mut self, start: u64, buf: &mut [u8]) -> Result<usize, ()> {
        let mut s = self.0.borrow_mut();
        let count = buf.len() / BLOCK_SIZE;
        s.reads.push((start, count));
        if s.fail_reads {
            return Err(());
        }
        if s.short_reads {
            return Ok(count.saturating_sub(1));
        }
        for (i, chunk) in buf.chunks_exact_mut(BLOCK_SIZE).enumerate() {
            let block = s.blocks.get(&(start + i as u64)).copied();
            chunk.copy_from_slice(&block.unwrap_or([0; BLOCK_SIZE]));
        }
        Ok(count)
    }
}

/// Block devices keyed by interface name and device number.
#[derive(Debug, Default)]
pub struct FakeStorage {
    pub devices: HashMap<(String, u32), FakeDisk>,
    pub lookups: Vec<(String, u32)>,
}

impl FakeStorage {
    /// Storage with one `mmc 0` device holding `block` at `index`.
    pub fn mmc_with_block(index: u64, block: [u8; BLOCK_SIZE]) -> Self {
        let disk = FakeDisk::default();
        disk.state().blocks.insert(index, block);
        let mut storage = FakeStorage::default();
        storage.devices.insert(("mmc".to_string(), 0), disk);
        storage
    }

    pub fn mmc(&self) -> FakeDisk {
        self.devices[&("mmc".to_string(), 0)].clone()
    }
}

impl BlockStorage for FakeStorage {
    type Device = FakeDisk;

    fn block_device(&mut self, interface: &str, dev: u32) -> Option<FakeDisk> {
        self.lookups.push((interface.to_string(), dev));
        self.devices.get(&(interface.to_string(), dev)).cloned()
    }
}

/// A reserved block carrying `magic` followed by `mac`.
pub fn record_block(magic: [u8; 2], mac: [u8; 6]) -> [u8; BLOCK_SIZE] {
    let mut block = [0xa5; BLOCK_SIZE];
    block[..2].copy_from_slice(&magic);
    block[2..8].copy_from_slice(&mac);
    block
}

//! Late board init sequence.
//!
//! `ProvisionMac -> InitKey -> QueryKey -> {Recovery | Normal}`. Nothing in
//! here may fail the boot: every error is logged and replaced by the safe
//! default (no MAC, key released).

use crate::PREBOOT_RECOVERY_CMD;
use crate::board::BoardConfig;
use crate::env::{Environment, PREBOOT};
use crate::key::{KeyHardware, RecoveryKey};
use crate::log::{info, warn};
use crate::mac::MacAddress;
use crate::provision::{ProvisionError, provision};
use crate::storage::BlockStorage;

/// Status handed back to the boot sequencer.
pub const LATE_INIT_OK: i32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BootPath {
    Normal,
    /// `preboot` now enters rockusb.
    Recovery,
}

impl core::fmt::Display for BootPath {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BootPath::Normal => write!(f, "normal"),
            BootPath::Recovery => write!(f, "rockusb"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacOutcome {
    /// The board has no MAC record.
    Skipped,
    Provisioned(MacAddress),
    Failed(ProvisionError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LateInitReport {
    pub mac: MacOutcome,
    pub key_pressed: bool,
    pub boot: BootPath,
}

pub struct LateInit<'b> {
    board: &'b BoardConfig,
    key: RecoveryKey,
}

impl<'b> LateInit<'b> {
    pub const fn new(board: &'b BoardConfig) -> Self {
        LateInit {
            board,
            key: RecoveryKey::new(),
        }
    }

    pub fn key(&self) -> &RecoveryKey {
        &self.key
    }

    pub fn run<S, E, H>(&mut self, storage: &mut S, env: &mut E, hw: &mut H) -> LateInitReport
    where
        S: BlockStorage,
        E: Environment,
        H: KeyHardware,
    {
        let mac = self.provision_mac(storage, env);

        self.key.init(self.board);
        let key_pressed = self.key.is_pressed(hw);

        let boot = if key_pressed {
            select_recovery(env)
        } else {
            BootPath::Normal
        };

        if key_pressed {
            info!("{}: recovery key pressed, boot {}", self.board.name, boot);
        }

        LateInitReport {
            mac,
            key_pressed,
            boot,
        }
    }

    fn provision_mac<S, E>(&self, storage: &mut S, env: &mut E) -> MacOutcome
    where
        S: BlockStorage,
        E: Environment,
    {
        let Some(location) = &self.board.mac_record else {
            return MacOutcome::Skipped;
        };

        match provision(storage, env, location) {
            Ok(mac) => MacOutcome::Provisioned(mac),
            Err(err) => MacOutcome::Failed(err),
        }
    }
}

fn select_recovery<E: Environment>(env: &mut E) -> BootPath {
    match env.set(PREBOOT, PREBOOT_RECOVERY_CMD) {
        Ok(()) => BootPath::Recovery,
        Err(err) => {
            warn!("rockusb: could not set preboot: {}", err);
            BootPath::Normal
        }
    }
}

/// Entry point for the boot sequencer. Always lets the boot continue.
pub fn board_late_init<S, E, H>(board: &BoardConfig, storage: &mut S, env: &mut E, hw: &mut H) -> i32
where
    S: BlockStorage,
    E: Environment,
    H: KeyHardware,
{
    LateInit::new(board).run(storage, env, hw);
    LATE_INIT_OK
}

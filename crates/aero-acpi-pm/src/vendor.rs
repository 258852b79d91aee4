//! Chipset profiles: window geometry, sleep-type tables and SMI routing family.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// The six supported power-management register layouts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vendor {
    /// ALi M7101.
    Ali,
    /// Intel PIIX4.
    #[default]
    Intel,
    /// Intel ICH2.
    IntelIch2,
    /// VIA VT82C586B.
    Via586b,
    /// VIA VT82C596B (and the 686A/B register superset).
    Via596b,
    /// SMC FDC73C931APM.
    Smc,
}

bitflags! {
    /// Actions tied to one `SLP_TYP` encoding.
    #[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct SuspendFlags: u8 {
        const POWER_OFF = 1 << 0;
        const SUSPEND = 1 << 1;
        /// Write the suspend-to-RAM marker into NVRAM.
        const NVR = 1 << 2;
        const RESET_CPU = 1 << 3;
        const RESET_PCI = 1 << 4;
        const RESET_CACHE = 1 << 5;
    }
}

/// How `raise_smi` gates and latches SMI for a vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SmiFamily {
    /// VIA: gated by `GLBCTL.SMI_EN`; `SMI_LOCK` + active latch suppress repeats.
    LatchedGlobal,
    /// Intel PIIX4 and ALi: gated by `GLBCTL.SMI_EN`, consumes a pending flag.
    PendingClear,
    /// ICH2: gated by `SMI_EN.GBL_SMI_EN` instead of a global-control bit.
    SmiEnable,
    /// SMC: no gating.
    Ungated,
}

/// NVRAM cell written with [`NVR_SUSPEND_MARKER`] on suspend-to-RAM.
pub(crate) const NVR_SUSPEND_OFFSET: u8 = 0x0F;
pub(crate) const NVR_SUSPEND_MARKER: u8 = 0xFF;

/// SMC's auxiliary SCI/SMI window.
pub const SMC_AUX_WINDOW_LEN: u16 = 0x08;

impl Vendor {
    pub const ALL: [Vendor; 6] = [
        Vendor::Ali,
        Vendor::Intel,
        Vendor::IntelIch2,
        Vendor::Via586b,
        Vendor::Via596b,
        Vendor::Smc,
    ];

    /// Length of the main PM I/O window. Offsets are reduced modulo this size.
    pub const fn window_len(self) -> u16 {
        match self {
            Vendor::Ali | Vendor::Intel => 0x40,
            Vendor::IntelIch2 | Vendor::Via596b => 0x80,
            Vendor::Via586b => 0x100,
            Vendor::Smc => 0x10,
        }
    }

    pub(crate) const fn offset_mask(self) -> u16 {
        self.window_len() - 1
    }

    /// Length of the auxiliary window, if the vendor has one.
    pub const fn aux_window_len(self) -> Option<u16> {
        match self {
            Vendor::Smc => Some(SMC_AUX_WINDOW_LEN),
            _ => None,
        }
    }

    pub(crate) const fn smi_family(self) -> SmiFamily {
        match self {
            Vendor::Via586b | Vendor::Via596b => SmiFamily::LatchedGlobal,
            Vendor::Intel | Vendor::Ali => SmiFamily::PendingClear,
            Vendor::IntelIch2 => SmiFamily::SmiEnable,
            Vendor::Smc => SmiFamily::Ungated,
        }
    }

    /// `SLP_TYP` to action table. Unlisted encodings do nothing.
    pub fn suspend_table(self) -> [SuspendFlags; 8] {
        const NONE: SuspendFlags = SuspendFlags::empty();
        const OFF: SuspendFlags = SuspendFlags::POWER_OFF;
        const SUS: SuspendFlags = SuspendFlags::SUSPEND;
        let str_full = SuspendFlags::SUSPEND
            | SuspendFlags::NVR
            | SuspendFlags::RESET_CPU
            | SuspendFlags::RESET_PCI;

        match self {
            Vendor::Ali => [OFF, OFF, str_full, SUS, NONE, NONE, NONE, NONE],
            Vendor::Via586b => [OFF, NONE, SUS, NONE, NONE, NONE, NONE, NONE],
            Vendor::Via596b => [
                NONE,
                str_full,
                OFF,
                NONE,
                SUS,
                SUS | SuspendFlags::RESET_CPU,
                SUS | SuspendFlags::RESET_CPU | SuspendFlags::RESET_PCI,
                NONE,
            ],
            Vendor::Intel => [
                OFF,
                str_full,
                SUS | SuspendFlags::RESET_CPU,
                SUS | SuspendFlags::RESET_CACHE,
                SUS,
                NONE,
                NONE,
                NONE,
            ],
            Vendor::IntelIch2 => [
                NONE,
                SUS | SuspendFlags::RESET_CPU,
                NONE,
                NONE,
                NONE,
                str_full,
                OFF,
                OFF,
            ],
            Vendor::Smc => [NONE; 8],
        }
    }
}

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::vendor::Vendor;

/// Default ISA line for SCI.
pub const DEFAULT_SCI_ISA_LINE: u8 = 9;
/// MIRQ used by the ALi M7101 for SCI.
pub const ALI_SCI_MIRQ: u8 = 5;
/// Reset value of the VT82C596B GPI port.
pub const VIA_596B_GPI_DEFAULT: u32 = 0xFFF5_7FC1;
/// Reset value of the VT82C596B GPO port.
pub const VIA_596B_GPO_DEFAULT: u32 = 0x7FFF_FFFF;
/// Reference clock assumed when no CPU speed is configured.
pub const DEFAULT_CPU_CLOCK_HZ: u64 = 33_000_000;

/// Where SCI is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SciRoute {
    /// A legacy ISA IRQ line (level, active high as seen by the PIC glue).
    Isa { line: u8 },
    /// A PCI INTx pin of the PM function. `pin` is 1..=4.
    PciIntx { slot: u8, pin: u8 },
    /// A chipset message IRQ.
    Mirq { mirq: u8, level_triggered: bool },
}

impl Default for SciRoute {
    fn default() -> Self {
        SciRoute::Isa {
            line: DEFAULT_SCI_ISA_LINE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("PCI interrupt pin {0} is out of range (expected 1..=4)")]
    InvalidPciPin(u8),

    #[error("ISA IRQ line {0} is out of range (expected 0..=15)")]
    InvalidIsaLine(u8),

    #[error("CPU clock rate must be non-zero")]
    ZeroCpuClock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcpiPmConfig {
    pub vendor: Vendor,
    pub sci_route: SciRoute,
    /// Reset value of GPIREG byte 2 (board straps such as cable detect).
    pub gpireg2_default: u8,
    /// Reset values of GPOREG bytes 0..=3.
    pub gporeg_defaults: [u8; 4],
    /// 32-bit PM timer instead of the 24-bit one.
    pub timer32: bool,
    /// Reference (CPU) clock the PM timer is derived from.
    pub cpu_clock_hz: u64,
    /// Reset value of the VT82C596B GPI port. Ignored by other vendors.
    pub via_gpi_default: u32,
}

impl Default for AcpiPmConfig {
    fn default() -> Self {
        Self::for_vendor(Vendor::default())
    }
}

impl AcpiPmConfig {
    /// Construction defaults for `vendor`.
    pub fn for_vendor(vendor: Vendor) -> Self {
        let sci_route = match vendor {
            Vendor::Ali => SciRoute::Mirq {
                mirq: ALI_SCI_MIRQ,
                level_triggered: false,
            },
            _ => SciRoute::default(),
        };
        Self {
            vendor,
            sci_route,
            gpireg2_default: 0,
            gporeg_defaults: [0; 4],
            timer32: false,
            cpu_clock_hz: DEFAULT_CPU_CLOCK_HZ,
            via_gpi_default: VIA_596B_GPI_DEFAULT,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.sci_route {
            SciRoute::PciIntx { pin, .. } if !(1..=4).contains(&pin) => {
                return Err(ConfigError::InvalidPciPin(pin));
            }
            SciRoute::Isa { line } if line > 15 => {
                return Err(ConfigError::InvalidIsaLine(line));
            }
            _ => {}
        }
        if self.cpu_clock_hz == 0 {
            return Err(ConfigError::ZeroCpuClock);
        }
        Ok(())
    }
}

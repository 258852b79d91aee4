#![forbid(unsafe_code)]
//! Chipset power-management (ACPI PM1 / GPE / SMI) controller.
//!
//! One [`AcpiPm`] models the PM function of a southbridge or super I/O. The register
//! layout and every bit quirk come from the [`Vendor`] chosen at construction:
//! ALi M7101, Intel PIIX4, Intel ICH2, VIA VT82C586B, VIA VT82C596B or SMC
//! FDC73C931APM.
//!
//! The controller is single threaded and synchronous. Guest port accesses go through
//! [`AcpiPm::port_read`]/[`AcpiPm::port_write`] (or a window installed with
//! [`io::update_io_mapping`]); time-based events (PM timer overflow, resume after
//! suspend) are deadlines in guest time that fire from [`AcpiPm::poll`] and at the
//! start of every port access.

pub mod clock;
pub mod config;
pub mod host;
pub mod io;
pub mod irq;
pub mod regs;
pub mod vendor;

mod decode;
mod pm;
mod sleep;
mod snapshot;
mod timer;

pub use config::{AcpiPmConfig, ConfigError, SciRoute};
pub use io::{update_aux_io_mapping, update_io_mapping, AcpiPmWindow, SharedAcpiPm};
pub use pm::{AcpiPm, AcpiPmCallbacks, RESUME_DELAY_NS};
pub use regs::PmRegs;
pub use timer::PM_TIMER_FREQUENCY_HZ;
pub use vendor::{SuspendFlags, Vendor};

//! `PMCNTRL` writes and the `SLP_TYP`/`SLP_EN` sleep transitions.

use crate::clock::Clock;
use crate::decode::Access;
use crate::pm::{AcpiPm, RESUME_DELAY_NS};
use crate::regs::{shift16, PMCNTRL, SLP_EN, SLP_TYP_MASK, SLP_TYP_SHIFT};
use crate::vendor::{SuspendFlags, Vendor, NVR_SUSPEND_MARKER, NVR_SUSPEND_OFFSET};

/// `SLP_EN` as seen in the high byte of `PMCNTRL`.
const SLP_EN_HI: u8 = (SLP_EN >> 8) as u8;
/// Low bit of `SLP_TYP` in the high byte.
const SLP_TYP0_HI: u8 = (1 << (SLP_TYP_SHIFT - 8)) as u8;
/// ICH2 `SMI_EN.SLP_SMI_EN`.
const ICH2_SLP_SMI_EN: u32 = 1 << 4;
/// ICH2 `SMI_STS.SLP_SMI_STS`.
const ICH2_SLP_SMI_STS: u32 = 1 << 4;

impl<C: Clock> AcpiPm<C> {
    /// Byte write to `PMCNTRL` at common offset 0x04/0x05.
    pub(crate) fn write_pm1_control(&mut self, acc: Access, addr: u16, val: u8) {
        let strobe = addr == 0x05 && val & SLP_EN_HI != 0;

        if strobe
            && self.cfg.vendor == Vendor::IntelIch2
            && val & SLP_TYP0_HI != 0
            && self.regs.smi_en & ICH2_SLP_SMI_EN != 0
        {
            tracing::debug!("sleep request trapped to SMI");
            self.regs.smi_sts |= ICH2_SLP_SMI_STS;
            self.raise_smi(true);
        } else if strobe {
            let pmcntrl = u32::from(val) << 8;
            let slp_typ = ((pmcntrl & SLP_TYP_MASK) >> SLP_TYP_SHIFT) as usize;
            let flags = self.suspend_types[slp_typ];
            tracing::debug!(slp_typ, ?flags, "sleep request");

            if flags.contains(SuspendFlags::POWER_OFF) {
                self.callbacks.host.power_off();
                return;
            }
            if flags.contains(SuspendFlags::SUSPEND) {
                self.enter_suspend(flags, acc.now_ns);
            }
        }

        PMCNTRL.write_byte(&mut self.regs.pmcntrl, shift16(addr), val);
    }

    fn enter_suspend(&mut self, flags: SuspendFlags, now: u64) {
        if self.suspended {
            tracing::debug!("already suspended; sleep strobe ignored");
            return;
        }

        if flags.contains(SuspendFlags::NVR) {
            self.callbacks
                .host
                .nvram_write(NVR_SUSPEND_OFFSET, NVR_SUSPEND_MARKER);
        }
        if flags.contains(SuspendFlags::RESET_PCI) {
            self.callbacks.host.reset_pci_devices();
            // The PM block is a PCI function too.
            self.reset_registers(now);
            let host = self.callbacks.host.as_mut();
            host.reset_pci_bus();
            host.reset_keyboard_controller();
            host.reset_a20_gate();
        }

        let host = self.callbacks.host.as_mut();
        if flags.intersects(SuspendFlags::RESET_CPU | SuspendFlags::RESET_CACHE) {
            host.flush_tlb();
        }
        if flags.contains(SuspendFlags::RESET_CPU) {
            host.reset_cpu();
        }
        host.pause();

        self.suspended = true;
        self.resume_rearmed = false;
        self.resume_deadline_ns = Some(now.saturating_add(RESUME_DELAY_NS));
    }
}

//! SMC FDC73C931APM: the common PM1 block plus an 8-byte auxiliary SCI/SMI window.

use super::Access;
use crate::clock::Clock;
use crate::pm::AcpiPm;
use crate::regs::{byte, shift16, MaskedReg, BM_RLD, BM_STS, GBL_EN, GBL_RLS, GBL_STS};

const SCI_STS: MaskedReg = MaskedReg::w1c(0x000C);
const SCI_EN: MaskedReg = MaskedReg::rw(0x3FFF);
const MISC_STS: MaskedReg = MaskedReg::w1c(0x001F);

const MISC_CTL_BIOS_RLS: u32 = 1 << 0;
const MISC_CTL_BM: u32 = 1 << 1;
const MISC_STS_BIOS: u32 = 1 << 0;
const MISC_EN_BIOS: u32 = 1 << 0;

impl<C: Clock> AcpiPm<C> {
    pub(super) fn write_smc(&mut self, acc: Access, addr: u16, val: u8) {
        self.write_common(acc, addr, val);
        let r = &mut self.regs;
        if addr == 0x00 && r.pmsts & GBL_STS == 0 {
            r.glbctl &= !MISC_CTL_BIOS_RLS;
        } else if addr == 0x04 && r.pmcntrl & GBL_RLS != 0 {
            r.glbsts |= MISC_STS_BIOS;
            if r.glben & MISC_EN_BIOS != 0 {
                self.raise_smi(true);
            }
        }
    }

    pub(super) fn read_smc_aux(&mut self, addr: u16) -> u8 {
        let r = &self.regs;
        match addr {
            // The SCI status port reads back the processor control register.
            0x00 | 0x01 => byte(r.pcntrl, shift16(addr)),
            0x02 | 0x03 => byte(r.gpscien, shift16(addr)),
            0x04 | 0x05 => byte(r.glbsts, shift16(addr)),
            0x06 => byte(r.glben, 0),
            0x07 => byte(r.glbctl, 0),
            _ => 0xFF,
        }
    }

    pub(super) fn write_smc_aux(&mut self, acc: Access, addr: u16, val: u8) {
        let r = &mut self.regs;
        match addr {
            0x00 | 0x01 => SCI_STS.clear_byte(&mut r.gpscists, shift16(addr), val),
            0x02 | 0x03 => SCI_EN.write_byte(&mut r.gpscien, shift16(addr), val),
            0x04 | 0x05 => MISC_STS.clear_byte(&mut r.glbsts, shift16(addr), val),
            0x06 => r.glben = u32::from(val & 0x03),
            0x07 => {
                r.glbctl = u32::from(val & 0x03);
                if r.glbctl & MISC_CTL_BIOS_RLS != 0 {
                    r.pmsts |= GBL_STS;
                    if r.pmen & GBL_EN != 0 {
                        self.update_irq(acc.now_ns);
                    }
                }
                let r = &mut self.regs;
                if r.glbctl & MISC_CTL_BM != 0 {
                    r.pmsts |= BM_STS;
                    if r.pmcntrl & BM_RLD != 0 {
                        self.update_irq(acc.now_ns);
                    }
                }
            }
            _ => {}
        }
    }
}

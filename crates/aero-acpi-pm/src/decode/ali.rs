//! ALi M7101.

use super::Access;
use crate::clock::Clock;
use crate::pm::AcpiPm;
use crate::regs::{byte, shift16, shift32, MaskedReg, GBL_RLS, GBL_STS};

const PCNTRL: MaskedReg = MaskedReg::rw(0x0002_3E1E);
const GPE0_STS: MaskedReg = MaskedReg::w1c(0x0D07);
const GPE0_EN: MaskedReg = MaskedReg::rw(0x0D07);
const GPE1_STS: MaskedReg = MaskedReg::w1c(0x0C01);
const GPE1_EN: MaskedReg = MaskedReg::rw(0x0C01);
const GPE1_CTL: MaskedReg = MaskedReg::rw(0x0000_0001);

/// `GPE1_CTL` bit mirroring the BIOS side of the global lock.
const GPCNTRL_BIOS_RLS: u32 = 1 << 1;
/// `GPE1_STS`/`GPE1_EN` bit for the global-lock release event.
const GPE1_GBL: u32 = 1 << 0;

impl<C: Clock> AcpiPm<C> {
    pub(super) fn read_ali(&mut self, acc: Access, addr: u16) -> u8 {
        let r = &self.regs;
        match addr {
            // The M7101 decodes PCNTRL reads as 16 bits wide: 0x12/0x13 alias 0x10/0x11.
            0x10..=0x13 => byte(r.pcntrl, shift16(addr)),
            0x14 => r.plvl2,
            0x15 => r.plvl3,
            0x18 | 0x19 => byte(r.gpsts, shift16(addr)),
            0x1A | 0x1B => byte(r.gpen, shift16(addr)),
            0x1C | 0x1D => byte(r.gpsts1, shift16(addr)),
            0x1E | 0x1F => byte(r.gpen1, shift16(addr)),
            0x20..=0x27 => byte(r.gpcntrl, shift32(addr)),
            // PM2_CNTRL
            0x30 => byte(r.pmcntrl, 0),
            _ => self.read_common(acc, addr),
        }
    }

    pub(super) fn write_ali(&mut self, acc: Access, addr: u16, val: u8) {
        let r = &mut self.regs;
        match addr {
            0x10..=0x13 => PCNTRL.write_byte(&mut r.pcntrl, shift32(addr), val),
            0x14 => r.plvl2 = val,
            0x15 => r.plvl3 = val,
            0x18 | 0x19 => GPE0_STS.clear_byte(&mut r.gpsts, shift16(addr), val),
            0x1A | 0x1B => GPE0_EN.write_byte(&mut r.gpen, shift16(addr), val),
            0x1C | 0x1D => GPE1_STS.clear_byte(&mut r.gpsts1, shift16(addr), val),
            0x1E | 0x1F => {
                // The untouched byte of GPE1_EN is taken from GPE0_EN.
                let mut v = r.gpen;
                GPE1_EN.write_byte(&mut v, shift16(addr), val);
                r.gpen1 = v;
            }
            0x20..=0x27 => GPE1_CTL.write_byte(&mut r.gpcntrl, shift32(addr), val),
            // PM2_CNTRL replaces the whole of PMCNTRL.
            0x30 => r.pmcntrl = u32::from(val & 1),
            _ => {
                self.write_common(acc, addr, val);
                if addr == 0x00 && self.regs.pmsts & GBL_STS == 0 {
                    self.regs.gpcntrl &= !GPCNTRL_BIOS_RLS;
                } else if addr == 0x04 && self.regs.pmcntrl & GBL_RLS != 0 {
                    self.regs.gpsts1 |= GPE1_GBL;
                    if self.regs.gpen1 & GPE1_GBL != 0 {
                        self.raise_smi(true);
                    }
                }
            }
        }
    }
}

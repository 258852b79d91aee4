//! Intel PIIX4 power-management function.

use super::Access;
use crate::clock::Clock;
use crate::pm::AcpiPm;
use crate::regs::{byte, shift16, shift32, MaskedReg, GBL_EN, GBL_RLS, GBL_STS};

const GPSTS: MaskedReg = MaskedReg::w1c(0x0F81);
const GPEN: MaskedReg = MaskedReg::rw(0x0F01);
const PCNTRL: MaskedReg = MaskedReg::rw(0x0002_3E1E);
const GLBSTS: MaskedReg = MaskedReg::w1c(0x0D27);
const DEVSTS: MaskedReg = MaskedReg::w1c(0x3FFF_0FFF);
const GLBEN: MaskedReg = MaskedReg::rw(0x8D1F);
const GLBCTL: MaskedReg = MaskedReg::rw(0x0701_FF07);
const DEVCTL: MaskedReg = MaskedReg::rw(0x0FFF_FFFF);

const GLBCTL_BIOS_RLS: u32 = 1 << 1;
const GLBSTS_BIOS_STS: u32 = 1 << 0;
const GLBEN_BIOS_EN: u32 = 1 << 1;

/// Summary bits synthesized into the low byte of `GLBSTS` on read.
const GLBSTS_GP_SUMMARY: u8 = 1 << 7;
const GLBSTS_PM1_SUMMARY: u8 = 1 << 6;
const GLBSTS_DEV_SUMMARY: u8 = 1 << 4;

impl<C: Clock> AcpiPm<C> {
    pub(super) fn read_intel(&mut self, acc: Access, addr: u16) -> u8 {
        let r = &self.regs;
        match addr {
            0x0C | 0x0D => byte(r.gpsts, shift16(addr)),
            0x0E | 0x0F => byte(r.gpen, shift16(addr)),
            0x10..=0x13 => byte(r.pcntrl, shift32(addr)),
            0x18 => {
                let mut v = byte(r.glbsts, 0) & 0x27;
                if r.gpsts != 0 {
                    v |= GLBSTS_GP_SUMMARY;
                }
                if r.pmsts != 0 {
                    v |= GLBSTS_PM1_SUMMARY;
                }
                if r.devsts != 0 {
                    v |= GLBSTS_DEV_SUMMARY;
                }
                v
            }
            0x19 => byte(r.glbsts, 8),
            0x1C..=0x1F => byte(r.devsts, shift32(addr)),
            0x20 | 0x21 => byte(r.glben, shift16(addr)),
            0x28..=0x2B => byte(r.glbctl, shift32(addr)),
            0x2C..=0x2F => byte(r.devctl, shift32(addr)),
            0x30..=0x32 if acc.is_byte() => r.gpireg[usize::from(addr & 3)],
            0x30..=0x32 => 0,
            0x34..=0x37 if acc.is_byte() => r.gporeg[usize::from(addr & 3)],
            0x34..=0x37 => 0,
            _ => self.read_common(acc, addr),
        }
    }

    pub(super) fn write_intel(&mut self, acc: Access, addr: u16, val: u8) {
        let r = &mut self.regs;
        match addr {
            0x0C | 0x0D => GPSTS.clear_byte(&mut r.gpsts, shift16(addr), val),
            0x0E | 0x0F => GPEN.write_byte(&mut r.gpen, shift16(addr), val),
            // Bit 1 of the third byte (bit 17) is sticky against writes of 0.
            0x12 => PCNTRL.write_byte_preserving(&mut r.pcntrl, shift32(addr), val, 0xFD),
            0x10 | 0x11 | 0x13 => PCNTRL.write_byte(&mut r.pcntrl, shift32(addr), val),
            0x18 | 0x19 => GLBSTS.clear_byte(&mut r.glbsts, shift16(addr), val),
            0x1C..=0x1F => DEVSTS.clear_byte(&mut r.devsts, shift32(addr), val),
            0x20 | 0x21 => GLBEN.write_byte(&mut r.glben, shift16(addr), val),
            0x28..=0x2B => {
                GLBCTL.write_byte(&mut r.glbctl, shift32(addr), val);
                if r.glbctl & GLBCTL_BIOS_RLS != 0 {
                    r.pmsts |= GBL_STS;
                    if r.pmen & GBL_EN != 0 {
                        self.update_irq(acc.now_ns);
                    }
                }
            }
            0x2C..=0x2F => {
                DEVCTL.write_byte(&mut r.devctl, shift32(addr), val);
                self.callbacks.host.trap_config_changed();
            }
            0x34..=0x37 => {
                if acc.is_byte() {
                    r.gporeg[usize::from(addr & 3)] = val;
                }
            }
            _ => {
                self.write_common(acc, addr, val);
                if addr == 0x00 && self.regs.pmsts & GBL_STS == 0 {
                    self.regs.glbctl &= !GLBCTL_BIOS_RLS;
                } else if addr == 0x04 && self.regs.pmcntrl & GBL_RLS != 0 {
                    self.regs.glbsts |= GLBSTS_BIOS_STS;
                    if self.regs.glben & GLBEN_BIOS_EN != 0 {
                        self.raise_smi(true);
                    }
                }
            }
        }
    }
}

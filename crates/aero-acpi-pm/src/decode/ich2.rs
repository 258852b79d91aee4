//! Intel ICH2 LPC power-management block.

use super::Access;
use crate::clock::Clock;
use crate::pm::AcpiPm;
use crate::regs::{byte, shift16, shift32, MaskedReg};

const PROC_CNT: MaskedReg = MaskedReg::rw(0x0002_01FE);
const GPE_STS: MaskedReg = MaskedReg::w1c(0x09FB);
const GPE_EN: MaskedReg = MaskedReg::rw(0x097D);
const SMI_EN: MaskedReg = MaskedReg::rw(0x0000_867F);
const SMI_STS: MaskedReg = MaskedReg::w1c(0x0001_FF7C);
const MON_SMI: MaskedReg = MaskedReg::rw(0x097D);
const DEVACT_STS: MaskedReg = MaskedReg::w1c(0x3FEF);
const DEVTRAP_EN: MaskedReg = MaskedReg::rw(0x3C2F);
const BUS_ADDR_TRACK: MaskedReg = MaskedReg::rw(0x097D);

/// `SMI_EN.BIOS_EN`: `GBL_RLS` writes trap to SMI.
const SMI_EN_BIOS_EN: u32 = 1 << 2;
const SMI_EN_APMC_EN: u8 = 1 << 5;
const SMI_EN_BIOS_RLS: u8 = 1 << 7;
/// `SMI_STS.BIOS_STS`.
const SMI_STS_BIOS: u32 = 1 << 2;
const GLBSTS_BIOS_RLS: u32 = 1 << 5;

/// `PMCNTRL.GBL_RLS` in the written low byte.
const GBL_RLS_LO: u8 = 1 << 2;
/// `PMEN.GBL_EN` / `PMCNTRL.SLP_EN` position in a written byte.
const BIT5: u8 = 1 << 5;

const TCO_BASE: u16 = 0x60;
const TCO_LAST: u16 = 0x70;

impl<C: Clock> AcpiPm<C> {
    pub(super) fn read_ich2(&mut self, acc: Access, addr: u16) -> u8 {
        let r = &self.regs;
        match addr {
            0x10..=0x13 => byte(r.pcntrl, shift32(addr)),
            0x28 | 0x29 => byte(r.gpsts, shift16(addr)),
            0x2A | 0x2B => byte(r.gpen, shift16(addr)),
            0x2C | 0x2D => byte(r.gpsts1, shift16(addr)),
            0x2E | 0x2F => byte(r.gpen1, shift16(addr)),
            0x30..=0x33 => byte(r.smi_en, shift32(addr)),
            0x34..=0x37 => byte(r.smi_sts, shift32(addr)),
            0x40 | 0x41 => byte(r.mon_smi, shift16(addr)),
            0x44 | 0x45 => byte(r.devact_sts, shift16(addr)),
            0x48 | 0x49 => byte(r.devtrap_en, shift16(addr)),
            0x4C | 0x4D => byte(r.bus_addr_track, shift16(addr)),
            0x4E => r.bus_cyc_track,
            TCO_BASE..=TCO_LAST => match self.callbacks.tco.as_mut() {
                Some(tco) => tco.read(addr as u8),
                None => 0,
            },
            _ => self.read_common(acc, addr),
        }
    }

    pub(super) fn write_ich2(&mut self, acc: Access, addr: u16, val: u8) {
        let r = &mut self.regs;
        match addr {
            0x10..=0x13 => PROC_CNT.write_byte(&mut r.pcntrl, shift32(addr), val),
            0x28 | 0x29 => GPE_STS.clear_byte(&mut r.gpsts, shift16(addr), val),
            0x2A | 0x2B => GPE_EN.write_byte(&mut r.gpen, shift16(addr), val),
            0x2C | 0x2D => GPE_STS.clear_byte(&mut r.gpsts1, shift16(addr), val),
            0x2E | 0x2F => {
                // The untouched byte of GPE1_EN is taken from GPE0_EN.
                let mut v = r.gpen;
                GPE_EN.write_byte(&mut v, shift16(addr), val);
                r.gpen1 = v;
            }
            0x30..=0x33 => {
                SMI_EN.write_byte(&mut r.smi_en, shift32(addr), val);
                if addr == 0x30 {
                    self.callbacks
                        .host
                        .set_apm_smi_enabled(val & SMI_EN_APMC_EN != 0);
                    if val & SMI_EN_BIOS_RLS != 0 {
                        self.regs.glbsts |= GLBSTS_BIOS_RLS;
                        self.update_irq(acc.now_ns);
                    }
                }
            }
            0x34..=0x37 => SMI_STS.clear_byte(&mut r.smi_sts, shift32(addr), val),
            0x40 | 0x41 => MON_SMI.write_byte(&mut r.mon_smi, shift16(addr), val),
            0x44 | 0x45 => DEVACT_STS.clear_byte(&mut r.devact_sts, shift16(addr), val),
            0x48 | 0x49 => {
                DEVTRAP_EN.write_byte(&mut r.devtrap_en, shift16(addr), val);
                self.callbacks.host.trap_config_changed();
            }
            0x4C | 0x4D => BUS_ADDR_TRACK.write_byte(&mut r.bus_addr_track, shift16(addr), val),
            0x4E => r.bus_cyc_track = val,
            TCO_BASE..=TCO_LAST => {
                if let Some(tco) = self.callbacks.tco.as_mut() {
                    tco.write(addr as u8, val);
                }
            }
            _ => {
                self.write_common(acc, addr, val);
                if addr == 0x04 && val & GBL_RLS_LO != 0 && self.regs.smi_en & SMI_EN_BIOS_EN != 0
                {
                    self.regs.smi_sts = SMI_STS_BIOS;
                    self.raise_smi(true);
                }
                if addr == 0x02 || val & BIT5 != 0 || self.regs.glbsts & GLBSTS_BIOS_RLS != 0 {
                    self.update_irq(acc.now_ns);
                }
            }
        }
    }
}

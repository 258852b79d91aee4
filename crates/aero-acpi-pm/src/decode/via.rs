//! VIA VT82C586B and VT82C596B. Both share the block at 0x10..=0x3B; each adds its own
//! global status masks and GPIO registers on top.

use super::Access;
use crate::clock::Clock;
use crate::pm::AcpiPm;
use crate::regs::{byte, shift16, shift32, MaskedReg, GBL_EN, GBL_RLS, GBL_STS};

const PCNTRL: MaskedReg = MaskedReg::rw(0x0000_001E);
const GPSTS: MaskedReg = MaskedReg::w1c(0x03FF);
const GP_SCI_EN: MaskedReg = MaskedReg::rw(0x03FF);
const GP_SMI_EN: MaskedReg = MaskedReg::rw(0x03FF);
const PSCNTRL: MaskedReg = MaskedReg::rw(0x0701);
const GPTREN: MaskedReg = MaskedReg::rw(0x0000_00D9);

const GLBSTS_586B: MaskedReg = MaskedReg::w1c(0x007F);
const GLBEN_586B: MaskedReg = MaskedReg::rw(0x007F);
const PADSTS_586B: MaskedReg = MaskedReg::w1c(0x0000_00FD);
const PADEN_586B: MaskedReg = MaskedReg::rw(0x0000_00FD);
const GPO_586B: MaskedReg = MaskedReg::rw(0xFFFF);

const GLBSTS_596B: MaskedReg = MaskedReg::w1c(0xFDFF);
const GLBEN_596B: MaskedReg = MaskedReg::rw(0xFDFF);
const PADSTS_596B: MaskedReg = MaskedReg::w1c(0x0000_07FF);
const PADEN_596B: MaskedReg = MaskedReg::rw(0x0000_07FF);
const GPO_596B: MaskedReg = MaskedReg::rw(0x7FFF_FFFF);

const GLBCTL_SMI_ACTIVE: u8 = 1 << 0;
const GLBCTL_BIOS_RLS: u32 = 1 << 1;
const GLBCTL_SMI_LOCK: u8 = 1 << 4;
/// Software-writable clear bit in the high byte of `GLBCTL`.
const GLBCTL_HI_CLEARABLE: u32 = 1 << 8;

const GLBSTS_BIOS: u32 = 1 << 5;
const GLBSTS_SMI_CMD: u32 = 1 << 6;

/// GPIO pins carrying the I2C clock and data lines on the 586B.
const GPIO_SCL: u8 = 1 << 1;
const GPIO_SDA: u8 = 1 << 2;
const GPIO_VAL_MASK: u8 = 0x13;
const EXT_IO_TRAP_MASK: u8 = 0x13;

impl<C: Clock> AcpiPm<C> {
    fn read_via_common(&mut self, acc: Access, addr: u16) -> u8 {
        let r = &self.regs;
        match addr {
            0x10..=0x13 => byte(r.pcntrl, shift32(addr)),
            0x20 | 0x21 => byte(r.gpsts, shift16(addr)),
            0x22 | 0x23 => byte(r.gpscien, shift16(addr)),
            0x24 | 0x25 => byte(r.gpsmien, shift16(addr)),
            0x26 | 0x27 => byte(r.pscntrl, shift16(addr)),
            0x28 | 0x29 => byte(r.glbsts, shift16(addr)),
            0x2A | 0x2B => byte(r.glben, shift16(addr)),
            0x2C | 0x2D => {
                // SMI_LOCK and SMI_ACTIVE are reported from their latches.
                let mut v = byte(r.glbctl, shift16(addr)) & !GLBCTL_SMI_LOCK;
                if r.smi_lock {
                    v |= GLBCTL_SMI_LOCK;
                }
                if r.smi_active {
                    v |= GLBCTL_SMI_ACTIVE;
                }
                v
            }
            0x2F if acc.is_byte() => r.smicmd,
            0x2F => 0,
            0x30..=0x33 => byte(r.padsts, shift32(addr)),
            0x34..=0x37 => byte(r.paden, shift32(addr)),
            0x38..=0x3B => byte(r.gptren, shift32(addr)),
            _ => self.read_common(acc, addr),
        }
    }

    fn write_via_common(&mut self, acc: Access, addr: u16, val: u8) {
        let r = &mut self.regs;
        match addr {
            0x10..=0x13 => PCNTRL.write_byte(&mut r.pcntrl, shift32(addr), val),
            0x20 | 0x21 => GPSTS.clear_byte(&mut r.gpsts, shift16(addr), val),
            0x22 | 0x23 => GP_SCI_EN.write_byte(&mut r.gpscien, shift16(addr), val),
            0x24 | 0x25 => GP_SMI_EN.write_byte(&mut r.gpsmien, shift16(addr), val),
            0x26 | 0x27 => PSCNTRL.write_byte(&mut r.pscntrl, shift16(addr), val),
            0x2C => {
                r.glbctl = (r.glbctl & !0xFF) | u32::from(val);
                r.smi_lock = val & GLBCTL_SMI_LOCK != 0;
                if r.glbctl & GLBCTL_BIOS_RLS != 0 {
                    r.pmsts |= GBL_STS;
                    if r.pmen & GBL_EN != 0 {
                        self.update_irq(acc.now_ns);
                    }
                }
            }
            0x2D => {
                r.glbctl &= !((u32::from(val) << 8) & GLBCTL_HI_CLEARABLE);
                if val & GLBCTL_SMI_ACTIVE != 0 {
                    r.smi_active = false;
                }
            }
            0x2F => {
                if acc.is_byte() {
                    r.smicmd = val;
                    r.glbsts |= GLBSTS_SMI_CMD;
                    if r.glben & GLBSTS_SMI_CMD != 0 {
                        self.raise_smi(true);
                    }
                }
            }
            0x38..=0x3B => GPTREN.write_byte(&mut r.gptren, shift32(addr), val),
            _ => {
                self.write_common(acc, addr, val);
                if addr == 0x00 && self.regs.pmsts & GBL_STS == 0 {
                    self.regs.glbctl &= !GLBCTL_BIOS_RLS;
                } else if addr == 0x04 && self.regs.pmcntrl & GBL_RLS != 0 {
                    self.regs.glbsts |= GLBSTS_BIOS;
                    if self.regs.glben & GLBSTS_BIOS != 0 {
                        self.raise_smi(true);
                    }
                }
            }
        }
    }

    /// Push the GPIO-driven SCL/SDA levels to the I2C bus. Pins configured as inputs
    /// float high.
    fn sync_i2c_lines(&mut self) {
        let (dir, val) = (self.regs.gpio_dir, self.regs.gpio_val);
        if let Some(i2c) = self.callbacks.i2c.as_mut() {
            let scl = dir & GPIO_SCL == 0 || val & GPIO_SCL != 0;
            let sda = dir & GPIO_SDA == 0 || val & GPIO_SDA != 0;
            i2c.set_lines(scl, sda);
        }
    }

    pub(super) fn read_via586b(&mut self, acc: Access, addr: u16) -> u8 {
        let r = &self.regs;
        match addr {
            0x40 if acc.is_byte() => r.gpio_dir,
            0x42 if acc.is_byte() => r.gpio_val & GPIO_VAL_MASK,
            0x44 if acc.is_byte() => {
                let mut v = byte(r.extsmi_val, 0);
                if let Some(i2c) = self.callbacks.i2c.as_ref() {
                    v &= !(GPIO_SCL | GPIO_SDA);
                    if r.gpio_dir & GPIO_SCL == 0 && i2c.scl() {
                        v |= GPIO_SCL;
                    }
                    if r.gpio_dir & GPIO_SDA == 0 && i2c.sda() {
                        v |= GPIO_SDA;
                    }
                }
                v
            }
            0x40 | 0x42 | 0x44 => 0,
            0x46 | 0x47 => byte(r.gpo_val, shift16(addr)),
            0x48 | 0x49 => byte(r.gpi_val, shift16(addr)),
            _ => self.read_via_common(acc, addr),
        }
    }

    pub(super) fn write_via586b(&mut self, acc: Access, addr: u16, val: u8) {
        let r = &mut self.regs;
        match addr {
            0x28 | 0x29 => GLBSTS_586B.clear_byte(&mut r.glbsts, shift16(addr), val),
            0x2A | 0x2B => GLBEN_586B.write_byte(&mut r.glben, shift16(addr), val),
            0x30..=0x33 => PADSTS_586B.clear_byte(&mut r.padsts, shift32(addr), val),
            0x34..=0x37 => {
                PADEN_586B.write_byte(&mut r.paden, shift32(addr), val);
                self.callbacks.host.trap_config_changed();
            }
            0x40 => {
                if acc.is_byte() {
                    r.gpio_dir = val & 0x7F;
                    self.sync_i2c_lines();
                }
            }
            0x42 => {
                if acc.is_byte() {
                    r.gpio_val = val & GPIO_VAL_MASK;
                    self.sync_i2c_lines();
                }
            }
            0x46 | 0x47 => GPO_586B.write_byte(&mut r.gpo_val, shift16(addr), val),
            _ => self.write_via_common(acc, addr, val),
        }
    }

    pub(super) fn read_via596b(&mut self, acc: Access, addr: u16) -> u8 {
        let r = &self.regs;
        match addr {
            0x40 => r.extiotrapsts,
            0x42 => r.extiotrapen,
            0x44 | 0x45 => byte(r.extsmi_val, shift16(addr)),
            0x48..=0x4B => byte(r.gpi_val, shift32(addr)),
            0x4C..=0x4F => byte(r.gpo_val, shift32(addr)),
            _ => self.read_via_common(acc, addr),
        }
    }

    pub(super) fn write_via596b(&mut self, acc: Access, addr: u16, val: u8) {
        let r = &mut self.regs;
        match addr {
            0x28 | 0x29 => GLBSTS_596B.clear_byte(&mut r.glbsts, shift16(addr), val),
            0x2A | 0x2B => GLBEN_596B.write_byte(&mut r.glben, shift16(addr), val),
            0x30..=0x33 => PADSTS_596B.clear_byte(&mut r.padsts, shift32(addr), val),
            0x34..=0x37 => {
                PADEN_596B.write_byte(&mut r.paden, shift32(addr), val);
                self.callbacks.host.trap_config_changed();
            }
            0x40 => r.extiotrapsts &= !(val & EXT_IO_TRAP_MASK),
            0x42 => r.extiotrapen = val & EXT_IO_TRAP_MASK,
            0x4C..=0x4F => GPO_596B.write_byte(&mut r.gpo_val, shift32(addr), val),
            _ => self.write_via_common(acc, addr, val),
        }
    }
}

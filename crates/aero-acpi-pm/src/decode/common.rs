//! PM1 status/enable/control and `PMTMR`, shared by every vendor.

use super::Access;
use crate::clock::Clock;
use crate::pm::AcpiPm;
use crate::regs::{byte, shift16, shift32, PMCNTRL, PMEN, PMSTS};

/// The common block is 64 bytes wide regardless of the vendor window.
const COMMON_MASK: u16 = 0x3F;

/// `PMSTS` high-byte bit that also clears the RTC event flag.
const RTC_STS_HI: u8 = 1 << 2;

impl<C: Clock> AcpiPm<C> {
    pub(super) fn read_common(&mut self, acc: Access, addr: u16) -> u8 {
        let addr = addr & COMMON_MASK;
        let r = &self.regs;
        match addr {
            0x00 => byte(r.pmsts, 0),
            0x01 => byte(r.pmsts, 8) | (u8::from(r.rtc_status) << 2),
            0x02 | 0x03 => byte(r.pmen, shift16(addr)),
            0x04 | 0x05 => PMCNTRL.read_byte(r.pmcntrl, shift16(addr)),
            0x08..=0x0B => byte(self.timer.value(acc.now_ns), shift32(addr)),
            _ => 0,
        }
    }

    pub(super) fn write_common(&mut self, acc: Access, addr: u16, val: u8) {
        let addr = addr & COMMON_MASK;
        let shift = shift16(addr);
        match addr {
            0x00 | 0x01 => {
                PMSTS.clear_byte(&mut self.regs.pmsts, shift, val);
                if addr == 0x01 && val & RTC_STS_HI != 0 {
                    self.regs.rtc_status = false;
                }
                self.update_irq(acc.now_ns);
            }
            0x02 | 0x03 => {
                PMEN.write_byte(&mut self.regs.pmen, shift, val);
                self.update_irq(acc.now_ns);
            }
            0x04 | 0x05 => self.write_pm1_control(acc, addr, val),
            // PMTMR is read-only.
            _ => {}
        }
    }
}

//! Per-vendor register decoders.
//!
//! Decoding is byte-granular. A 2- or 4-byte guest access arrives here as consecutive
//! single-byte calls, each carrying the width of the whole guest access (a few registers
//! only answer byte accesses). Ports are reduced modulo the vendor's window size first,
//! so narrow register blocks repeat across the window.

mod ali;
mod common;
mod ich2;
mod intel;
mod smc;
mod via;

use crate::clock::Clock;
use crate::pm::AcpiPm;
use crate::vendor::Vendor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Access {
    /// Width of the guest access this byte belongs to (1, 2 or 4).
    pub size: u8,
    /// Guest time sampled once for the whole access.
    pub now_ns: u64,
}

impl Access {
    pub fn is_byte(self) -> bool {
        self.size == 1
    }
}

impl<C: Clock> AcpiPm<C> {
    pub(crate) fn decode_read(&mut self, acc: Access, port: u16) -> u8 {
        let addr = port & self.cfg.vendor.offset_mask();
        match self.cfg.vendor {
            Vendor::Ali => self.read_ali(acc, addr),
            Vendor::Intel => self.read_intel(acc, addr),
            Vendor::IntelIch2 => self.read_ich2(acc, addr),
            Vendor::Via586b => self.read_via586b(acc, addr),
            Vendor::Via596b => self.read_via596b(acc, addr),
            Vendor::Smc => self.read_common(acc, addr),
        }
    }

    pub(crate) fn decode_write(&mut self, acc: Access, port: u16, val: u8) {
        let addr = port & self.cfg.vendor.offset_mask();
        match self.cfg.vendor {
            Vendor::Ali => self.write_ali(acc, addr, val),
            Vendor::Intel => self.write_intel(acc, addr, val),
            Vendor::IntelIch2 => self.write_ich2(acc, addr, val),
            Vendor::Via586b => self.write_via586b(acc, addr, val),
            Vendor::Via596b => self.write_via596b(acc, addr, val),
            Vendor::Smc => self.write_smc(acc, addr, val),
        }
    }

    pub(crate) fn decode_aux_read(&mut self, _acc: Access, port: u16) -> u8 {
        match self.cfg.vendor.aux_window_len() {
            Some(len) => self.read_smc_aux(port & (len - 1)),
            None => 0xFF,
        }
    }

    pub(crate) fn decode_aux_write(&mut self, acc: Access, port: u16, val: u8) {
        if let Some(len) = self.cfg.vendor.aux_window_len() {
            self.write_smc_aux(acc, port & (len - 1), val);
        }
    }
}

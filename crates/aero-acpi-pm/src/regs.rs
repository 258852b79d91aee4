//! Register bank and the masked-register helper shared by every vendor decoder.
//!
//! Registers are stored widened to `u32`; the per-register [`MaskedReg`] keeps the
//! architectural width by never letting bits outside its masks become set.

/// `PMSTS.TMROF_STS`: PM timer crossed an overflow boundary.
pub const TMROF_STS: u32 = 1 << 0;
/// `PMSTS.BM_STS`: bus master activity.
pub const BM_STS: u32 = 1 << 4;
/// `PMSTS.GBL_STS`: firmware released the global lock (BIOS_RLS).
pub const GBL_STS: u32 = 1 << 5;
/// `PMSTS.PWRBTN_STS`.
pub const PWRBTN_STS: u32 = 1 << 8;
/// `PMSTS.RTC_STS`.
pub const RTC_STS: u32 = 1 << 10;
/// `PMSTS.WAK_STS`: set on resume and at power on.
pub const WAK_STS: u32 = 1 << 15;

pub const TMROF_EN: u32 = 1 << 0;
pub const GBL_EN: u32 = 1 << 5;
pub const PWRBTN_EN: u32 = 1 << 8;
pub const RTC_EN: u32 = 1 << 10;

/// Enable bits whose matching status bit raises SCI.
pub const SCI_WAKE_MASK: u32 = RTC_EN | PWRBTN_EN | GBL_EN | TMROF_EN;

/// `PMCNTRL.SCI_EN`: events route to SCI instead of SMI.
pub const SCI_EN: u32 = 1 << 0;
/// `PMCNTRL.BM_RLD`.
pub const BM_RLD: u32 = 1 << 1;
/// `PMCNTRL.GBL_RLS`: OS releases the global lock, signalling firmware.
pub const GBL_RLS: u32 = 1 << 2;
pub const SLP_TYP_SHIFT: u32 = 10;
pub const SLP_TYP_MASK: u32 = 0b111 << SLP_TYP_SHIFT;
/// `PMCNTRL.SLP_EN`: write-only strobe.
pub const SLP_EN: u32 = 1 << 13;

/// PMSTS bits software may clear.
pub(crate) const PMSTS: MaskedReg = MaskedReg::w1c(0x8D31);
/// PMEN: RTC, power button, global and timer overflow enables.
pub(crate) const PMEN: MaskedReg = MaskedReg::rw(0x0521);
/// PMCNTRL with `SLP_EN` reading back as zero.
pub(crate) const PMCNTRL: MaskedReg = MaskedReg::rw(0x3F07).with_write_only(SLP_EN);

/// Bit behaviour of one register.
///
/// - `writable`: bits a plain write may change (everything else reads back as 0).
/// - `clearable`: status bits a write-1-to-clear may clear.
/// - `write_only`: bits stored but always read back as 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MaskedReg {
    pub writable: u32,
    pub clearable: u32,
    pub write_only: u32,
}

impl MaskedReg {
    pub const fn rw(writable: u32) -> Self {
        Self {
            writable,
            clearable: 0,
            write_only: 0,
        }
    }

    pub const fn w1c(clearable: u32) -> Self {
        Self {
            writable: 0,
            clearable,
            write_only: 0,
        }
    }

    pub const fn with_write_only(self, write_only: u32) -> Self {
        Self { write_only, ..self }
    }

    /// Replace the byte lane at `shift` with `val`, then drop non-writable bits.
    pub fn write_byte(self, reg: &mut u32, shift: u32, val: u8) {
        self.write_byte_preserving(reg, shift, val, 0xFF);
    }

    /// Like [`Self::write_byte`], but only the lane bits in `lane_mask` are replaced
    /// before `val` is OR-ed in; the remaining old lane bits survive.
    pub fn write_byte_preserving(self, reg: &mut u32, shift: u32, val: u8, lane_mask: u8) {
        *reg = ((*reg & !(u32::from(lane_mask) << shift)) | (u32::from(val) << shift))
            & self.writable;
    }

    /// Write-1-to-clear on the byte lane at `shift`.
    pub fn clear_byte(self, reg: &mut u32, shift: u32, val: u8) {
        *reg &= !((u32::from(val) << shift) & self.clearable);
    }

    pub fn read_byte(self, reg: u32, shift: u32) -> u8 {
        byte(reg & !self.write_only, shift)
    }
}

#[inline]
pub(crate) fn byte(reg: u32, shift: u32) -> u8 {
    (reg >> shift) as u8
}

/// Byte-lane shift for a 16-bit register at `addr`.
#[inline]
pub(crate) fn shift16(addr: u16) -> u32 {
    u32::from(addr & 1) << 3
}

/// Byte-lane shift for a 32-bit register at `addr`.
#[inline]
pub(crate) fn shift32(addr: u16) -> u32 {
    u32::from(addr & 3) << 3
}

/// Per-instance register state. Zeroed (plus fixed defaults) on every reset.
///
/// Not every vendor decodes every field; unused fields simply stay at their reset value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PmRegs {
    pub pmsts: u32,
    pub pmen: u32,
    pub pmcntrl: u32,

    /// General purpose event bank 0 (status / enable).
    pub gpsts: u32,
    pub gpen: u32,
    /// General purpose event bank 1 (status / enable).
    pub gpsts1: u32,
    pub gpen1: u32,
    pub gpscien: u32,
    pub gpsmien: u32,
    pub gpscists: u32,
    pub pscntrl: u32,

    pub glbsts: u32,
    pub glben: u32,
    pub glbctl: u32,
    pub devsts: u32,
    pub devctl: u32,

    pub pcntrl: u32,
    pub plvl2: u8,
    pub plvl3: u8,
    pub gpcntrl: u32,

    pub smicmd: u8,
    pub padsts: u32,
    pub paden: u32,
    pub gptren: u32,

    pub gpio_dir: u8,
    pub gpio_val: u8,
    pub gpo_val: u32,
    pub gpi_val: u32,
    pub extsmi_val: u32,
    pub extiotrapsts: u8,
    pub extiotrapen: u8,

    pub gpireg: [u8; 3],
    pub gporeg: [u8; 4],

    // ICH2 only.
    pub smi_en: u32,
    pub smi_sts: u32,
    pub mon_smi: u32,
    pub devact_sts: u32,
    pub devtrap_en: u32,
    pub bus_addr_track: u32,
    pub bus_cyc_track: u8,

    /// VIA `GLBCTL.SMI_LOCK` mirror.
    pub smi_lock: bool,
    /// SMI-active latch (VIA family).
    pub smi_active: bool,
    pub ali_soft_smi: bool,
    /// RTC event flag, reported through `PMSTS` bit 10 on reads.
    pub rtc_status: bool,
}

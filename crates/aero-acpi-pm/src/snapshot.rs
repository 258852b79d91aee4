use aero_io_snapshot::io::state::codec::{Decoder, Encoder};
use aero_io_snapshot::io::state::{
    IoSnapshot, SnapshotError, SnapshotReader, SnapshotResult, SnapshotVersion, SnapshotWriter,
};

use crate::clock::Clock;
use crate::pm::AcpiPm;
use crate::regs::PmRegs;
use crate::vendor::Vendor;

const TAG_VENDOR: u16 = 1;
const TAG_PM1: u16 = 2;
const TAG_GPE: u16 = 3;
const TAG_GLOBAL: u16 = 4;
const TAG_PROC: u16 = 5;
const TAG_VIA: u16 = 6;
const TAG_GPIO: u16 = 7;
const TAG_ICH2: u16 = 8;
const TAG_LATCHES: u16 = 9;
const TAG_TIMER_TICKS: u16 = 10;
const TAG_SUSPEND: u16 = 11;
const TAG_RESUME_IN_NS: u16 = 12;

fn vendor_code(v: Vendor) -> u8 {
    match v {
        Vendor::Ali => 0,
        Vendor::Intel => 1,
        Vendor::IntelIch2 => 2,
        Vendor::Via586b => 3,
        Vendor::Via596b => 4,
        Vendor::Smc => 5,
    }
}

fn decode_field<T>(
    r: &SnapshotReader<'_>,
    tag: u16,
    f: impl FnOnce(&mut Decoder<'_>) -> SnapshotResult<T>,
) -> SnapshotResult<Option<T>> {
    let Some(buf) = r.bytes(tag) else {
        return Ok(None);
    };
    let mut d = Decoder::new(buf);
    let v = f(&mut d)?;
    d.finish()?;
    Ok(Some(v))
}

impl<C: Clock> IoSnapshot for AcpiPm<C> {
    const DEVICE_ID: [u8; 4] = *b"CHPM";
    const DEVICE_VERSION: SnapshotVersion = SnapshotVersion::new(1, 0);

    fn save_state(&self) -> Vec<u8> {
        let now = self.clock.now_ns();
        let r = &self.regs;

        let mut w = SnapshotWriter::new(Self::DEVICE_ID, Self::DEVICE_VERSION);
        w.field_u8(TAG_VENDOR, vendor_code(self.cfg.vendor));
        w.field_bytes(
            TAG_PM1,
            Encoder::new().u32(r.pmsts).u32(r.pmen).u32(r.pmcntrl).finish(),
        );
        w.field_bytes(
            TAG_GPE,
            Encoder::new()
                .u32(r.gpsts)
                .u32(r.gpen)
                .u32(r.gpsts1)
                .u32(r.gpen1)
                .u32(r.gpscien)
                .u32(r.gpsmien)
                .u32(r.gpscists)
                .u32(r.pscntrl)
                .finish(),
        );
        w.field_bytes(
            TAG_GLOBAL,
            Encoder::new()
                .u32(r.glbsts)
                .u32(r.glben)
                .u32(r.glbctl)
                .u32(r.devsts)
                .u32(r.devctl)
                .finish(),
        );
        w.field_bytes(
            TAG_PROC,
            Encoder::new()
                .u32(r.pcntrl)
                .u8(r.plvl2)
                .u8(r.plvl3)
                .u32(r.gpcntrl)
                .finish(),
        );
        w.field_bytes(
            TAG_VIA,
            Encoder::new()
                .u8(r.smicmd)
                .u32(r.padsts)
                .u32(r.paden)
                .u32(r.gptren)
                .u8(r.extiotrapsts)
                .u8(r.extiotrapen)
                .finish(),
        );
        w.field_bytes(
            TAG_GPIO,
            Encoder::new()
                .u8(r.gpio_dir)
                .u8(r.gpio_val)
                .u32(r.gpo_val)
                .u32(r.gpi_val)
                .u32(r.extsmi_val)
                .bytes(&r.gpireg)
                .bytes(&r.gporeg)
                .finish(),
        );
        w.field_bytes(
            TAG_ICH2,
            Encoder::new()
                .u32(r.smi_en)
                .u32(r.smi_sts)
                .u32(r.mon_smi)
                .u32(r.devact_sts)
                .u32(r.devtrap_en)
                .u32(r.bus_addr_track)
                .u8(r.bus_cyc_track)
                .finish(),
        );
        w.field_bytes(
            TAG_LATCHES,
            Encoder::new()
                .bool(r.smi_lock)
                .bool(r.smi_active)
                .bool(r.ali_soft_smi)
                .bool(r.rtc_status)
                .finish(),
        );
        w.field_u64(TAG_TIMER_TICKS, self.timer.ticks(now));
        w.field_bytes(
            TAG_SUSPEND,
            Encoder::new()
                .bool(self.suspended)
                .bool(self.resume_rearmed)
                .finish(),
        );
        if let Some(at) = self.resume_deadline_ns {
            w.field_u64(TAG_RESUME_IN_NS, at.saturating_sub(now));
        }

        // Host wiring (`callbacks`), the clock and the I/O mapping are not serialized.
        w.finish()
    }

    fn load_state(&mut self, bytes: &[u8]) -> SnapshotResult<()> {
        let r = SnapshotReader::parse(bytes, Self::DEVICE_ID)?;
        r.ensure_device_major(Self::DEVICE_VERSION.major)?;

        if let Some(code) = r.u8(TAG_VENDOR)? {
            if code != vendor_code(self.cfg.vendor) {
                return Err(SnapshotError::Corrupt("vendor mismatch"));
            }
        }

        // Decode into a scratch bank so a bad field leaves the device untouched.
        let mut regs = PmRegs::default();

        if let Some((pmsts, pmen, pmcntrl)) =
            decode_field(&r, TAG_PM1, |d| Ok((d.u32()?, d.u32()?, d.u32()?)))?
        {
            regs.pmsts = pmsts;
            regs.pmen = pmen;
            regs.pmcntrl = pmcntrl;
        }
        decode_field(&r, TAG_GPE, |d| {
            regs.gpsts = d.u32()?;
            regs.gpen = d.u32()?;
            regs.gpsts1 = d.u32()?;
            regs.gpen1 = d.u32()?;
            regs.gpscien = d.u32()?;
            regs.gpsmien = d.u32()?;
            regs.gpscists = d.u32()?;
            regs.pscntrl = d.u32()?;
            Ok(())
        })?;
        decode_field(&r, TAG_GLOBAL, |d| {
            regs.glbsts = d.u32()?;
            regs.glben = d.u32()?;
            regs.glbctl = d.u32()?;
            regs.devsts = d.u32()?;
            regs.devctl = d.u32()?;
            Ok(())
        })?;
        decode_field(&r, TAG_PROC, |d| {
            regs.pcntrl = d.u32()?;
            regs.plvl2 = d.u8()?;
            regs.plvl3 = d.u8()?;
            regs.gpcntrl = d.u32()?;
            Ok(())
        })?;
        decode_field(&r, TAG_VIA, |d| {
            regs.smicmd = d.u8()?;
            regs.padsts = d.u32()?;
            regs.paden = d.u32()?;
            regs.gptren = d.u32()?;
            regs.extiotrapsts = d.u8()?;
            regs.extiotrapen = d.u8()?;
            Ok(())
        })?;
        decode_field(&r, TAG_GPIO, |d| {
            regs.gpio_dir = d.u8()?;
            regs.gpio_val = d.u8()?;
            regs.gpo_val = d.u32()?;
            regs.gpi_val = d.u32()?;
            regs.extsmi_val = d.u32()?;
            regs.gpireg = d.array::<3>()?;
            regs.gporeg = d.array::<4>()?;
            Ok(())
        })?;
        decode_field(&r, TAG_ICH2, |d| {
            regs.smi_en = d.u32()?;
            regs.smi_sts = d.u32()?;
            regs.mon_smi = d.u32()?;
            regs.devact_sts = d.u32()?;
            regs.devtrap_en = d.u32()?;
            regs.bus_addr_track = d.u32()?;
            regs.bus_cyc_track = d.u8()?;
            Ok(())
        })?;
        decode_field(&r, TAG_LATCHES, |d| {
            regs.smi_lock = d.bool()?;
            regs.smi_active = d.bool()?;
            regs.ali_soft_smi = d.bool()?;
            regs.rtc_status = d.bool()?;
            Ok(())
        })?;

        let ticks = r.u64(TAG_TIMER_TICKS)?;
        let (suspended, resume_rearmed) =
            decode_field(&r, TAG_SUSPEND, |d| Ok((d.bool()?, d.bool()?)))?
                .unwrap_or((false, false));
        let resume_in = r.u64(TAG_RESUME_IN_NS)?;

        let now = self.clock.now_ns();
        self.regs = regs;
        self.timer.rebase(now, ticks.unwrap_or(0));
        self.suspended = suspended;
        self.resume_rearmed = resume_rearmed;
        self.resume_deadline_ns = resume_in.map(|delta| now.saturating_add(delta));

        // Re-drive SCI and the overflow wake from the restored latches.
        self.update_irq(now);
        Ok(())
    }
}

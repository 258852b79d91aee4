use crate::clock::{Clock, NullClock};
use crate::config::{AcpiPmConfig, ConfigError, SciRoute, VIA_596B_GPO_DEFAULT};
use crate::decode::Access;
use crate::host::{I2cGpio, NullHost, PmHost, TcoRegisters};
use crate::irq::{InterruptFabric, NoIrq};
use crate::regs::{PmRegs, BM_STS, SCI_EN, SCI_WAKE_MASK, TMROF_EN, TMROF_STS, WAK_STS};
use crate::timer::PmTimer;
use crate::vendor::{SmiFamily, SuspendFlags, Vendor};

/// Delay between a suspend request and the wake event that follows it.
pub const RESUME_DELAY_NS: u64 = 50_000;

/// `GLBCTL.SMI_EN` on the vendors that gate SMI through global control.
const GLBCTL_SMI_EN: u32 = 1 << 0;
/// Intel PIIX4 `GLBCTL` bit consumed when an SMI is delivered.
const INTEL_GLBCTL_SMI_PENDING: u32 = 1 << 16;
/// ICH2 `SMI_EN.GBL_SMI_EN`.
const ICH2_GBL_SMI_EN: u32 = 1 << 0;
/// APM status bit in Intel `GLBSTS` and ICH2 `SMI_STS`.
const APM_STS: u32 = 1 << 5;

pub struct AcpiPmCallbacks {
    /// SCI routing and SMI delivery.
    pub irq: Box<dyn InterruptFabric>,
    /// Sleep actions, trap notifications and the SMM query.
    pub host: Box<dyn PmHost>,
    /// GPIO-driven I2C bus (VIA 586B).
    pub i2c: Option<Box<dyn I2cGpio>>,
    /// TCO watchdog registers (ICH2).
    pub tco: Option<Box<dyn TcoRegisters>>,
}

impl AcpiPmCallbacks {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for AcpiPmCallbacks {
    fn default() -> Self {
        Self {
            irq: Box::new(NoIrq),
            host: Box::new(NullHost),
            i2c: None,
            tco: None,
        }
    }
}

/// Chipset power-management controller.
pub struct AcpiPm<C: Clock = NullClock> {
    pub(crate) cfg: AcpiPmConfig,
    pub(crate) callbacks: AcpiPmCallbacks,
    pub(crate) clock: C,
    pub(crate) suspend_types: [SuspendFlags; 8],

    pub(crate) regs: PmRegs,
    pub(crate) timer: PmTimer,
    pub(crate) sci_level: bool,

    pub(crate) overflow_deadline_ns: Option<u64>,
    pub(crate) resume_deadline_ns: Option<u64>,
    /// Held from a SUSPEND transition until its first resume event.
    pub(crate) suspended: bool,
    pub(crate) resume_rearmed: bool,

    pub(crate) io_base: u16,
    pub(crate) io_mapped: Option<u16>,
    pub(crate) aux_io_base: u16,
    pub(crate) aux_io_mapped: Option<u16>,
}

impl AcpiPm<NullClock> {
    pub fn new(cfg: AcpiPmConfig) -> Result<Self, ConfigError> {
        Self::new_with_callbacks(cfg, AcpiPmCallbacks::default())
    }

    pub fn new_with_callbacks(
        cfg: AcpiPmConfig,
        callbacks: AcpiPmCallbacks,
    ) -> Result<Self, ConfigError> {
        Self::new_with_callbacks_and_clock(cfg, callbacks, NullClock)
    }
}

impl<C: Clock> AcpiPm<C> {
    pub fn new_with_callbacks_and_clock(
        cfg: AcpiPmConfig,
        callbacks: AcpiPmCallbacks,
        clock: C,
    ) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let now = clock.now_ns();
        let mut dev = Self {
            cfg,
            callbacks,
            clock,
            suspend_types: cfg.vendor.suspend_table(),
            regs: PmRegs::default(),
            timer: PmTimer::new(cfg.cpu_clock_hz, cfg.timer32, now),
            sci_level: false,
            overflow_deadline_ns: None,
            resume_deadline_ns: None,
            suspended: false,
            resume_rearmed: false,
            io_base: 0,
            io_mapped: None,
            aux_io_base: 0,
            aux_io_mapped: None,
        };
        dev.reset();
        Ok(dev)
    }

    pub fn config(&self) -> AcpiPmConfig {
        self.cfg
    }

    pub fn vendor(&self) -> Vendor {
        self.cfg.vendor
    }

    pub fn sci_level(&self) -> bool {
        self.sci_level
    }

    /// Read-only view of the register bank.
    pub fn regs(&self) -> &PmRegs {
        &self.regs
    }

    /// Current `PMTMR` value.
    pub fn pm_timer(&self) -> u32 {
        self.timer.value(self.clock.now_ns())
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn smi_active(&self) -> bool {
        self.regs.smi_active
    }

    pub fn io_base(&self) -> u16 {
        self.io_base
    }

    pub fn aux_io_base(&self) -> u16 {
        self.aux_io_base
    }

    /// Earliest pending timer event (overflow or resume), in guest nanoseconds.
    pub fn next_deadline_ns(&self) -> Option<u64> {
        match (self.overflow_deadline_ns, self.resume_deadline_ns) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Fire every timer event that is due at the current guest time.
    pub fn poll(&mut self) {
        let now = self.clock.now_ns();
        self.poll_at(now);
    }

    pub(crate) fn poll_at(&mut self, now: u64) {
        loop {
            let overflow = self.overflow_deadline_ns.filter(|&t| t <= now);
            let resume = self.resume_deadline_ns.filter(|&t| t <= now);
            match (overflow, resume) {
                (Some(o), Some(r)) if r < o => self.fire_resume(r),
                (Some(o), _) => self.fire_overflow(o),
                (None, Some(r)) => self.fire_resume(r),
                (None, None) => break,
            }
        }
    }

    /// Power-on / system reset.
    ///
    /// The PM timer keeps counting: it is derived from the CPU cycle counter, not
    /// from register state.
    pub fn reset(&mut self) {
        let now = self.clock.now_ns();

        self.resume_deadline_ns = None;
        self.suspended = false;
        self.resume_rearmed = false;
        self.reset_registers(now);
    }

    /// Register-bank reset shared by power-on and the PCI reset of a sleep transition.
    /// Leaves the suspend latch and a pending resume alone.
    pub(crate) fn reset_registers(&mut self, now: u64) {
        self.regs = PmRegs::default();
        self.regs.gpireg = [0xFF, 0xFF, self.cfg.gpireg2_default];
        self.regs.gporeg = self.cfg.gporeg_defaults;
        if self.cfg.vendor == Vendor::Via596b {
            self.regs.gpo_val = VIA_596B_GPO_DEFAULT;
            self.regs.gpi_val = self.cfg.via_gpi_default;
        }
        // A reset always latches a wake event.
        self.regs.pmsts |= WAK_STS;

        self.update_irq(now);
    }

    /// The reference CPU clock changed speed.
    pub fn speed_changed(&mut self, cpu_clock_hz: u64) {
        let now = self.clock.now_ns();
        self.poll_at(now);
        self.timer.set_cpu_hz(now, cpu_clock_hz);
        self.cfg.cpu_clock_hz = cpu_clock_hz;
        if self.overflow_deadline_ns.is_some() {
            self.overflow_deadline_ns = Some(self.timer.next_overflow_ns(now));
        }
    }

    /// Latch bits into `PMSTS` and refresh SCI.
    pub fn trigger_pm1_event(&mut self, sts_bits: u16) {
        let now = self.clock.now_ns();
        self.poll_at(now);
        self.regs.pmsts |= u32::from(sts_bits);
        self.update_irq(now);
    }

    pub fn trigger_power_button(&mut self) {
        self.trigger_pm1_event(crate::regs::PWRBTN_STS as u16);
    }

    /// Set or clear the RTC event flag reported through `PMSTS.RTC_STS` reads.
    pub fn set_rtc_status(&mut self, status: bool) {
        self.regs.rtc_status = status;
    }

    pub fn rtc_status(&self) -> bool {
        self.regs.rtc_status
    }

    /// Chipset side of an APM command port (0xB2) write.
    pub fn apm_command(&mut self, do_smi: bool) {
        let now = self.clock.now_ns();
        self.poll_at(now);
        match self.cfg.vendor {
            Vendor::Ali => {
                if do_smi {
                    tracing::debug!("ALi soft SMI");
                    self.callbacks.irq.raise_smi();
                }
                self.regs.ali_soft_smi = true;
            }
            vendor => {
                match vendor {
                    Vendor::Intel => self.regs.glbsts |= APM_STS,
                    Vendor::IntelIch2 if do_smi => self.regs.smi_sts |= APM_STS,
                    _ => {}
                }
                self.raise_smi(do_smi);
            }
        }
    }

    /// Reads the ALi soft-SMI status. Reading forces the flag to 1 and returns 1.
    pub fn ali_soft_smi_status_read(&mut self) -> u8 {
        self.regs.ali_soft_smi = true;
        1
    }

    pub fn ali_soft_smi_status_write(&mut self, soft_smi: u8) {
        self.regs.ali_soft_smi = soft_smi != 0;
    }

    /// Main window access at absolute `port`. Multi-byte accesses decode byte by byte.
    pub fn port_read(&mut self, port: u16, size: u8) -> u32 {
        let acc = self.begin_access(size);
        let mut out = 0u32;
        for i in 0..acc.size {
            let b = self.decode_read(acc, port.wrapping_add(u16::from(i)));
            out |= u32::from(b) << (u32::from(i) * 8);
        }
        if acc.size != 1 {
            tracing::trace!(port, size = acc.size, value = out, "PM read");
        }
        out
    }

    pub fn port_write(&mut self, port: u16, size: u8, value: u32) {
        let acc = self.begin_access(size);
        if acc.size != 1 {
            tracing::trace!(port, size = acc.size, value, "PM write");
        }
        for i in 0..acc.size {
            let b = (value >> (u32::from(i) * 8)) as u8;
            self.decode_write(acc, port.wrapping_add(u16::from(i)), b);
        }
    }

    /// Auxiliary window access (SMC only; other vendors float high).
    pub fn aux_port_read(&mut self, port: u16, size: u8) -> u32 {
        let acc = self.begin_access(size);
        let mut out = 0u32;
        for i in 0..acc.size {
            let b = self.decode_aux_read(acc, port.wrapping_add(u16::from(i)));
            out |= u32::from(b) << (u32::from(i) * 8);
        }
        out
    }

    pub fn aux_port_write(&mut self, port: u16, size: u8, value: u32) {
        let acc = self.begin_access(size);
        for i in 0..acc.size {
            let b = (value >> (u32::from(i) * 8)) as u8;
            self.decode_aux_write(acc, port.wrapping_add(u16::from(i)), b);
        }
    }

    fn begin_access(&mut self, size: u8) -> Access {
        let now_ns = self.clock.now_ns();
        self.poll_at(now_ns);
        Access {
            size: size.clamp(1, 4),
            now_ns,
        }
    }

    fn fire_overflow(&mut self, at: u64) {
        self.overflow_deadline_ns = None;
        self.regs.pmsts |= TMROF_STS;

        if self.regs.pmen & TMROF_EN != 0 {
            let sci_en = self.regs.pmcntrl & SCI_EN != 0;
            tracing::debug!(sci_en, "PM timer overflow");
            if sci_en {
                self.update_irq(at);
            } else {
                self.raise_smi(true);
            }
        }
    }

    fn fire_resume(&mut self, at: u64) {
        self.resume_deadline_ns = None;
        self.suspended = false;
        self.regs.pmsts |= WAK_STS;
        tracing::debug!("resume event");

        // Some SMI sleep traps clear WAK_STS before returning to the OS; signal it again
        // once after the handler is done.
        if self.callbacks.host.in_smm() && !self.resume_rearmed {
            self.resume_rearmed = true;
            self.resume_deadline_ns = Some(at.saturating_add(RESUME_DELAY_NS));
        }
    }

    fn drive_sci_level(&mut self, level: bool) {
        if level == self.sci_level {
            return;
        }
        self.sci_level = level;
        let irq = self.callbacks.irq.as_mut();
        match self.cfg.sci_route {
            SciRoute::Isa { line } => irq.set_isa_irq(line, level),
            SciRoute::PciIntx { slot, pin } => irq.set_pci_irq(slot, pin, level),
            SciRoute::Mirq {
                mirq,
                level_triggered,
            } => irq.set_mirq(mirq, level_triggered, level),
        }
    }

    /// Re-evaluate SCI and the overflow timer from `PMSTS`/`PMEN`.
    pub(crate) fn update_irq(&mut self, now: u64) {
        let (pmsts, pmen) = (self.regs.pmsts, self.regs.pmen);
        let mut level = pmsts & pmen & SCI_WAKE_MASK != 0;
        if self.cfg.vendor == Vendor::Smc {
            level |= pmsts & BM_STS != 0;
        }
        self.drive_sci_level(level);

        // The overflow wake only runs while its event is enabled and not yet latched.
        let armed = pmen & TMROF_EN != 0 && pmsts & TMROF_STS == 0;
        self.overflow_deadline_ns = armed.then(|| self.timer.next_overflow_ns(now));
    }

    pub(crate) fn raise_smi(&mut self, do_smi: bool) {
        let vendor = self.cfg.vendor;
        let r = &mut self.regs;
        let deliver = match vendor.smi_family() {
            SmiFamily::LatchedGlobal => {
                if r.glbctl & GLBCTL_SMI_EN == 0 {
                    false
                } else if r.smi_lock && r.smi_active {
                    tracing::debug!("SMI suppressed by SMI_LOCK");
                    false
                } else {
                    r.smi_active = true;
                    do_smi
                }
            }
            SmiFamily::PendingClear => {
                if r.glbctl & GLBCTL_SMI_EN == 0 {
                    false
                } else {
                    if vendor == Vendor::Intel {
                        r.glbctl &= !INTEL_GLBCTL_SMI_PENDING;
                    } else {
                        r.ali_soft_smi = true;
                    }
                    do_smi
                }
            }
            SmiFamily::SmiEnable => do_smi && r.smi_en & ICH2_GBL_SMI_EN != 0,
            SmiFamily::Ungated => do_smi,
        };

        if deliver {
            tracing::debug!(?vendor, "raising SMI");
            self.callbacks.irq.raise_smi();
        }
    }
}

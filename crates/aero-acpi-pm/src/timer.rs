//! PM timer: a 3.579545 MHz counter projected from the CPU cycle counter.
//!
//! The counter is a pure function of guest time, so reads need no bookkeeping. A clock
//! rate change folds the progress so far into `base_ticks` and restarts the projection
//! from that instant, which keeps the visible value continuous.

/// ACPI PM timer frequency.
pub const PM_TIMER_FREQUENCY_HZ: u64 = 3_579_545;

const NS_PER_SEC: u128 = 1_000_000_000;

const MASK_24BIT: u64 = 0x00FF_FFFF;
const MASK_32BIT: u64 = 0xFFFF_FFFF;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PmTimer {
    cpu_hz: u64,
    timer32: bool,
    /// Ticks accumulated before `anchor_ns`.
    base_ticks: u64,
    anchor_ns: u64,
}

impl PmTimer {
    pub fn new(cpu_hz: u64, timer32: bool, now_ns: u64) -> Self {
        Self {
            cpu_hz: cpu_hz.max(1),
            timer32,
            base_ticks: 0,
            anchor_ns: now_ns,
        }
    }

    fn cycles_since_anchor(&self, now_ns: u64) -> u128 {
        let elapsed = u128::from(now_ns.saturating_sub(self.anchor_ns));
        elapsed * u128::from(self.cpu_hz) / NS_PER_SEC
    }

    /// Full-precision tick count.
    pub fn ticks(&self, now_ns: u64) -> u64 {
        let cycles = self.cycles_since_anchor(now_ns);
        let ticks = cycles * u128::from(PM_TIMER_FREQUENCY_HZ) / u128::from(self.cpu_hz);
        self.base_ticks.wrapping_add(ticks as u64)
    }

    pub fn counter_mask(&self) -> u64 {
        if self.timer32 {
            MASK_32BIT
        } else {
            MASK_24BIT
        }
    }

    /// `PMTMR` as the guest sees it.
    pub fn value(&self, now_ns: u64) -> u32 {
        (self.ticks(now_ns) & self.counter_mask()) as u32
    }

    /// Guest time at which the counter next wraps its visible width.
    pub fn next_overflow_ns(&self, now_ns: u64) -> u64 {
        let range = u128::from(self.counter_mask()) + 1;
        let now_ticks = u128::from(self.ticks(now_ns));
        let target = (now_ticks / range + 1) * range;

        let hz = u128::from(self.cpu_hz);
        let ticks_needed = target.saturating_sub(u128::from(self.base_ticks));
        let cycles = (ticks_needed * hz).div_ceil(u128::from(PM_TIMER_FREQUENCY_HZ));
        let delta_ns = (cycles * NS_PER_SEC).div_ceil(hz);

        let deadline = u128::from(self.anchor_ns) + delta_ns;
        u64::try_from(deadline).unwrap_or(u64::MAX)
    }

    /// Switch the reference clock rate at `now_ns` without disturbing the counter.
    pub fn set_cpu_hz(&mut self, now_ns: u64, cpu_hz: u64) {
        self.rebase(now_ns, self.ticks(now_ns));
        self.cpu_hz = cpu_hz.max(1);
    }

    /// Continue counting from `ticks` at `now_ns`.
    pub fn rebase(&mut self, now_ns: u64, ticks: u64) {
        self.base_ticks = ticks;
        self.anchor_ns = now_ns;
    }
}

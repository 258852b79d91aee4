#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use aero_acpi_pm::clock::ManualClock;
use aero_acpi_pm::host::{I2cGpio, PmHost};
use aero_acpi_pm::irq::InterruptFabric;
use aero_acpi_pm::{AcpiPm, AcpiPmCallbacks, AcpiPmConfig, Vendor};

/// Port base used by the tests. Aligned to the largest window (0x100).
pub const BASE: u16 = 0x4000;
pub const AUX_BASE: u16 = 0x4800;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Isa(u8, bool),
    Pci(u8, u8, bool),
    Mirq(u8, bool, bool),
    Smi,
    Nvram(u8, u8),
    ResetPciDevices,
    ResetPciBus,
    ResetKeyboard,
    ResetA20,
    FlushTlb,
    ResetCpu,
    Pause,
    PowerOff,
    TrapChanged,
    ApmSmiEnabled(bool),
    I2c(bool, bool),
}

/// Interrupt fabric + host fake that logs every call.
#[derive(Clone, Default)]
pub struct Recorder {
    events: Rc<RefCell<Vec<Event>>>,
    in_smm: Rc<Cell<bool>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    pub fn take(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub fn count(&self, ev: Event) -> usize {
        self.events.borrow().iter().filter(|&&e| e == ev).count()
    }

    pub fn smi_count(&self) -> usize {
        self.count(Event::Smi)
    }

    pub fn set_in_smm(&self, in_smm: bool) {
        self.in_smm.set(in_smm);
    }

    fn push(&self, ev: Event) {
        self.events.borrow_mut().push(ev);
    }
}

impl InterruptFabric for Recorder {
    fn set_pci_irq(&mut self, slot: u8, pin: u8, level: bool) {
        self.push(Event::Pci(slot, pin, level));
    }

    fn set_mirq(&mut self, mirq: u8, level_triggered: bool, level: bool) {
        self.push(Event::Mirq(mirq, level_triggered, level));
    }

    fn set_isa_irq(&mut self, line: u8, level: bool) {
        self.push(Event::Isa(line, level));
    }

    fn raise_smi(&mut self) {
        self.push(Event::Smi);
    }
}

impl PmHost for Recorder {
    fn in_smm(&self) -> bool {
        self.in_smm.get()
    }

    fn nvram_write(&mut self, offset: u8, value: u8) {
        self.push(Event::Nvram(offset, value));
    }

    fn reset_pci_devices(&mut self) {
        self.push(Event::ResetPciDevices);
    }

    fn reset_pci_bus(&mut self) {
        self.push(Event::ResetPciBus);
    }

    fn reset_keyboard_controller(&mut self) {
        self.push(Event::ResetKeyboard);
    }

    fn reset_a20_gate(&mut self) {
        self.push(Event::ResetA20);
    }

    fn flush_tlb(&mut self) {
        self.push(Event::FlushTlb);
    }

    fn reset_cpu(&mut self) {
        self.push(Event::ResetCpu);
    }

    fn pause(&mut self) {
        self.push(Event::Pause);
    }

    fn power_off(&mut self) {
        self.push(Event::PowerOff);
    }

    fn trap_config_changed(&mut self) {
        self.push(Event::TrapChanged);
    }

    fn set_apm_smi_enabled(&mut self, enabled: bool) {
        self.push(Event::ApmSmiEnabled(enabled));
    }
}

/// Two-wire bus fake: lines read back whatever was last driven.
#[derive(Clone)]
pub struct FakeI2c {
    rec: Recorder,
    lines: Rc<Cell<(bool, bool)>>,
}

impl FakeI2c {
    pub fn new(rec: &Recorder) -> Self {
        Self {
            rec: rec.clone(),
            lines: Rc::new(Cell::new((true, true))),
        }
    }

    pub fn force(&self, scl: bool, sda: bool) {
        self.lines.set((scl, sda));
    }
}

impl I2cGpio for FakeI2c {
    fn set_lines(&mut self, scl: bool, sda: bool) {
        self.lines.set((scl, sda));
        self.rec.push(Event::I2c(scl, sda));
    }

    fn scl(&self) -> bool {
        self.lines.get().0
    }

    fn sda(&self) -> bool {
        self.lines.get().1
    }
}

pub fn callbacks(rec: &Recorder) -> AcpiPmCallbacks {
    AcpiPmCallbacks {
        irq: Box::new(rec.clone()),
        host: Box::new(rec.clone()),
        i2c: None,
        tco: None,
    }
}

pub fn device_with(cfg: AcpiPmConfig) -> (AcpiPm<ManualClock>, Recorder, ManualClock) {
    let rec = Recorder::new();
    let clock = ManualClock::new();
    let pm = AcpiPm::new_with_callbacks_and_clock(cfg, callbacks(&rec), clock.clone())
        .expect("valid config");
    (pm, rec, clock)
}

pub fn device(vendor: Vendor) -> (AcpiPm<ManualClock>, Recorder, ManualClock) {
    device_with(AcpiPmConfig::for_vendor(vendor))
}

pub fn read8(pm: &mut AcpiPm<ManualClock>, off: u16) -> u8 {
    pm.port_read(BASE + off, 1) as u8
}

pub fn write8(pm: &mut AcpiPm<ManualClock>, off: u16, val: u8) {
    pm.port_write(BASE + off, 1, u32::from(val));
}

pub fn read16(pm: &mut AcpiPm<ManualClock>, off: u16) -> u16 {
    pm.port_read(BASE + off, 2) as u16
}

pub fn write16(pm: &mut AcpiPm<ManualClock>, off: u16, val: u16) {
    pm.port_write(BASE + off, 2, u32::from(val));
}

pub fn read32(pm: &mut AcpiPm<ManualClock>, off: u16) -> u32 {
    pm.port_read(BASE + off, 4)
}

pub fn write32(pm: &mut AcpiPm<ManualClock>, off: u16, val: u32) {
    pm.port_write(BASE + off, 4, val);
}

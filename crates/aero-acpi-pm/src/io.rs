//! Port-I/O windows and their (re)mapping on an [`IoPortBus`].

use std::cell::RefCell;
use std::rc::Rc;

use aero_platform::io::{IoPortBus, PortIoDevice};

use crate::clock::{Clock, NullClock};
use crate::pm::AcpiPm;

pub type SharedAcpiPm<C = NullClock> = Rc<RefCell<AcpiPm<C>>>;

impl<C: Clock + 'static> PortIoDevice for AcpiPm<C> {
    fn read(&mut self, port: u16, size: u8) -> u32 {
        self.port_read(port, size)
    }

    fn write(&mut self, port: u16, size: u8, value: u32) {
        self.port_write(port, size, value);
    }

    fn reset(&mut self) {
        AcpiPm::reset(self);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WindowKind {
    Main,
    Aux,
}

/// One mapped window onto a shared controller.
pub struct AcpiPmWindow<C: Clock = NullClock> {
    pm: SharedAcpiPm<C>,
    kind: WindowKind,
}

impl<C: Clock + 'static> PortIoDevice for AcpiPmWindow<C> {
    fn read(&mut self, port: u16, size: u8) -> u32 {
        let mut pm = self.pm.borrow_mut();
        match self.kind {
            WindowKind::Main => pm.port_read(port, size),
            WindowKind::Aux => pm.aux_port_read(port, size),
        }
    }

    fn write(&mut self, port: u16, size: u8, value: u32) {
        let mut pm = self.pm.borrow_mut();
        match self.kind {
            WindowKind::Main => pm.port_write(port, size, value),
            WindowKind::Aux => pm.aux_port_write(port, size, value),
        }
    }

    fn reset(&mut self) {
        // Both windows share one controller; reset it once.
        if self.kind == WindowKind::Main {
            self.pm.borrow_mut().reset();
        }
    }
}

/// Move the main PM window to `base`, or just remove it when `enabled` is false.
///
/// A base of 0 means "not programmed" and never maps.
pub fn update_io_mapping<C: Clock + 'static>(
    bus: &mut IoPortBus,
    pm: &SharedAcpiPm<C>,
    base: u16,
    enabled: bool,
) {
    let len = pm.borrow().vendor().window_len();
    remap(bus, pm, WindowKind::Main, len, base, enabled);
}

/// Same as [`update_io_mapping`] for the auxiliary window. Vendors without one only
/// record the base.
pub fn update_aux_io_mapping<C: Clock + 'static>(
    bus: &mut IoPortBus,
    pm: &SharedAcpiPm<C>,
    base: u16,
    enabled: bool,
) {
    let aux_len = pm.borrow().vendor().aux_window_len();
    match aux_len {
        Some(len) => remap(bus, pm, WindowKind::Aux, len, base, enabled),
        None => pm.borrow_mut().aux_io_base = base,
    }
}

fn remap<C: Clock + 'static>(
    bus: &mut IoPortBus,
    pm: &SharedAcpiPm<C>,
    kind: WindowKind,
    len: u16,
    base: u16,
    enabled: bool,
) {
    let mut dev = pm.borrow_mut();
    let (old_base, mapped) = match kind {
        WindowKind::Main => (dev.io_base, &mut dev.io_mapped),
        WindowKind::Aux => (dev.aux_io_base, &mut dev.aux_io_mapped),
    };
    tracing::debug!(?kind, old_base, base, enabled, "PM I/O remap");

    if let Some(start) = mapped.take() {
        bus.unmap_window(start, len);
    }
    if enabled && base != 0 {
        let window = AcpiPmWindow {
            pm: pm.clone(),
            kind,
        };
        match bus.map_window(base, len, Box::new(window)) {
            Ok(()) => *mapped = Some(base),
            Err(err) => tracing::warn!(%err, ?kind, "failed to map PM I/O window"),
        }
    }

    match kind {
        WindowKind::Main => dev.io_base = base,
        WindowKind::Aux => dev.aux_io_base = base,
    }
}

//! x86 port I/O dispatch.
//!
//! Devices claim contiguous port windows. An access is routed by its *starting* port: a
//! 4-byte read at the last port of a window is delivered to that window's device in one
//! call, and the device decides how to decompose it. Unclaimed ports float high.

use std::collections::BTreeMap;

use thiserror::Error;

pub trait PortIoDevice {
    fn read(&mut self, port: u16, size: u8) -> u32;
    fn write(&mut self, port: u16, size: u8, value: u32);

    /// Reset the device back to its power-on state.
    fn reset(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IoMapError {
    #[error("I/O window at {start:#06x} has zero length")]
    Empty { start: u16 },

    #[error("I/O window {start:#06x}+{len:#x} wraps past port 0xFFFF")]
    Wraps { start: u16, len: u16 },

    #[error("I/O window {start:#06x}+{len:#x} overlaps window at {existing:#06x}")]
    Overlap { start: u16, len: u16, existing: u16 },
}

struct Window {
    len: u16,
    dev: Box<dyn PortIoDevice>,
}

impl Window {
    fn end_exclusive(start: u16, len: u16) -> u32 {
        u32::from(start) + u32::from(len)
    }
}

/// Value read from a port nobody decodes.
pub fn floating_bus(size: u8) -> u32 {
    match size {
        1 => 0xFF,
        2 => 0xFFFF,
        _ => 0xFFFF_FFFF,
    }
}

#[derive(Default)]
pub struct IoPortBus {
    windows: BTreeMap<u16, Window>,
}

impl IoPortBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `[start, start + len)` for `dev`.
    pub fn map_window(
        &mut self,
        start: u16,
        len: u16,
        dev: Box<dyn PortIoDevice>,
    ) -> Result<(), IoMapError> {
        if len == 0 {
            return Err(IoMapError::Empty { start });
        }
        let end = Window::end_exclusive(start, len);
        if end > 0x1_0000 {
            return Err(IoMapError::Wraps { start, len });
        }

        if let Some((&prev_start, prev)) = self.windows.range(..=start).next_back() {
            if Window::end_exclusive(prev_start, prev.len) > u32::from(start) {
                return Err(IoMapError::Overlap {
                    start,
                    len,
                    existing: prev_start,
                });
            }
        }
        if let Some((&next_start, _)) = self.windows.range(start..).next() {
            if u32::from(next_start) < end {
                return Err(IoMapError::Overlap {
                    start,
                    len,
                    existing: next_start,
                });
            }
        }

        tracing::trace!(start, len, "mapped I/O window");
        self.windows.insert(start, Window { len, dev });
        Ok(())
    }

    /// Release the window previously mapped at exactly `(start, len)`.
    pub fn unmap_window(&mut self, start: u16, len: u16) -> Option<Box<dyn PortIoDevice>> {
        match self.windows.get(&start) {
            Some(w) if w.len == len => {}
            _ => return None,
        }
        tracing::trace!(start, len, "unmapped I/O window");
        self.windows.remove(&start).map(|w| w.dev)
    }

    pub fn is_mapped(&self, port: u16) -> bool {
        self.window_for(port).is_some()
    }

    fn window_for(&self, port: u16) -> Option<u16> {
        let (&start, w) = self.windows.range(..=port).next_back()?;
        (u32::from(port) < Window::end_exclusive(start, w.len)).then_some(start)
    }

    pub fn read(&mut self, port: u16, size: u8) -> u32 {
        // Port I/O instructions only exist in 1/2/4 byte forms.
        if !matches!(size, 1 | 2 | 4) {
            return floating_bus(size);
        }
        match self.window_for(port) {
            Some(start) => match self.windows.get_mut(&start) {
                Some(w) => w.dev.read(port, size),
                None => floating_bus(size),
            },
            None => floating_bus(size),
        }
    }

    pub fn write(&mut self, port: u16, size: u8, value: u32) {
        if !matches!(size, 1 | 2 | 4) {
            return;
        }
        if let Some(start) = self.window_for(port) {
            if let Some(w) = self.windows.get_mut(&start) {
                w.dev.write(port, size, value);
            }
        }
    }

    pub fn read_u8(&mut self, port: u16) -> u8 {
        self.read(port, 1) as u8
    }

    pub fn write_u8(&mut self, port: u16, value: u8) {
        self.write(port, 1, u32::from(value));
    }

    pub fn reset(&mut self) {
        for w in self.windows.values_mut() {
            w.dev.reset();
        }
    }
}

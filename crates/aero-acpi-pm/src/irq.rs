//! Interrupt plumbing consumed by the controller.

/// The chipset's view of the interrupt fabric: the three SCI routing schemes plus SMI.
///
/// SCI calls are level updates; the controller only calls them when the level changes.
pub trait InterruptFabric {
    /// Drive a PCI INTx line. `pin` is 1..=4 (INTA#..INTD#).
    fn set_pci_irq(&mut self, slot: u8, pin: u8, level: bool);
    /// Drive a chipset message IRQ (MIRQ) line.
    fn set_mirq(&mut self, mirq: u8, level_triggered: bool, level: bool);
    /// Drive a legacy ISA IRQ line.
    fn set_isa_irq(&mut self, line: u8, level: bool);
    /// Pulse SMI# to the CPU.
    fn raise_smi(&mut self);
}

/// Interrupt sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoIrq;

impl InterruptFabric for NoIrq {
    fn set_pci_irq(&mut self, _slot: u8, _pin: u8, _level: bool) {}
    fn set_mirq(&mut self, _mirq: u8, _level_triggered: bool, _level: bool) {}
    fn set_isa_irq(&mut self, _line: u8, _level: bool) {}
    fn raise_smi(&mut self) {}
}

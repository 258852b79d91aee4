//! Host-side hooks the controller drives: sleep actions, trap notifications and the
//! optional side channels (I2C GPIO mirroring, the ICH2 TCO block).

/// System-level actions requested by the power-management block.
///
/// Every method defaults to a no-op so embedders only implement what they wire up.
pub trait PmHost {
    /// Whether the CPU is currently executing in System Management Mode.
    fn in_smm(&self) -> bool {
        false
    }

    fn nvram_write(&mut self, _offset: u8, _value: u8) {}

    /// Reset every PCI-attached device.
    fn reset_pci_devices(&mut self) {}

    /// Reset the PCI bus itself (bridges, routing).
    fn reset_pci_bus(&mut self) {}

    fn reset_keyboard_controller(&mut self) {}

    fn reset_a20_gate(&mut self) {}

    fn flush_tlb(&mut self) {}

    fn reset_cpu(&mut self) {}

    /// Cooperative request to stop running guest code until the resume event fires.
    fn pause(&mut self) {}

    fn power_off(&mut self) {}

    /// Device-trap enable bits changed; the embedder should reprogram its I/O traps.
    fn trap_config_changed(&mut self) {}

    /// ICH2 `SMI_EN.APMC_EN` changed.
    fn set_apm_smi_enabled(&mut self, _enabled: bool) {}
}

/// Host that ignores every request.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHost;

impl PmHost for NullHost {}

/// Two GPIO pins wired to an I2C bus (VIA 586B).
pub trait I2cGpio {
    fn set_lines(&mut self, scl: bool, sda: bool);
    fn scl(&self) -> bool;
    fn sda(&self) -> bool;
}

/// The ICH2 TCO watchdog block, addressed by its offset inside the PM window.
pub trait TcoRegisters {
    fn read(&mut self, offset: u8) -> u8;
    fn write(&mut self, offset: u8, value: u8);
}

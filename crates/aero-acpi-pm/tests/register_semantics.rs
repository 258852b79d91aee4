mod util;

use aero_acpi_pm::regs::{
    BM_STS, GBL_STS, PWRBTN_EN, PWRBTN_STS, RTC_STS, SCI_EN, TMROF_STS, WAK_STS,
};
use aero_acpi_pm::{AcpiPmConfig, Vendor};
use proptest::prelude::*;
use util::{device, device_with, read16, read32, read8, write16, write32, write8, Event, BASE};

#[test]
fn pm1_status_write_ones_clears_only_defined_bits() {
    for vendor in Vendor::ALL {
        let (mut pm, _rec, _clock) = device(vendor);
        pm.trigger_pm1_event((TMROF_STS | BM_STS | GBL_STS | PWRBTN_STS | RTC_STS) as u16);
        // Bit 1 is reserved: hardware may latch it, software cannot clear it.
        pm.trigger_pm1_event(0x0002);

        write16(&mut pm, 0x00, 0xFFFF);
        assert_eq!(pm.regs().pmsts, 0x0002, "{vendor:?}");
        assert_eq!(read16(&mut pm, 0x00), 0x0002, "{vendor:?}");
    }
}

#[test]
fn pm1_status_write_zero_is_a_no_op() {
    let (mut pm, _rec, _clock) = device(Vendor::Intel);
    pm.trigger_power_button();
    write16(&mut pm, 0x00, 0);
    assert_eq!(pm.regs().pmsts, WAK_STS | PWRBTN_STS);
}

#[test]
fn power_button_raises_sci_only_when_enabled() {
    let (mut pm, rec, _clock) = device(Vendor::Intel);
    pm.trigger_power_button();
    assert!(!pm.sci_level());

    write16(&mut pm, 0x02, PWRBTN_EN as u16);
    assert!(pm.sci_level());
    assert_eq!(rec.events(), vec![Event::Isa(9, true)]);

    write16(&mut pm, 0x00, PWRBTN_STS as u16);
    assert!(!pm.sci_level());
    assert_eq!(rec.events(), vec![Event::Isa(9, true), Event::Isa(9, false)]);
}

#[test]
fn sci_follows_configured_route() {
    let (mut ali, rec, _clock) = device(Vendor::Ali);
    write16(&mut ali, 0x02, PWRBTN_EN as u16);
    ali.trigger_power_button();
    assert_eq!(rec.events(), vec![Event::Mirq(5, false, true)]);

    let cfg = AcpiPmConfig {
        sci_route: aero_acpi_pm::SciRoute::PciIntx { slot: 7, pin: 1 },
        ..AcpiPmConfig::for_vendor(Vendor::Via596b)
    };
    let (mut via, rec, _clock) = device_with(cfg);
    write16(&mut via, 0x02, PWRBTN_EN as u16);
    via.trigger_power_button();
    assert_eq!(rec.events(), vec![Event::Pci(7, 1, true)]);
}

#[test]
fn smc_bus_master_status_raises_sci_without_enable() {
    let (mut pm, rec, _clock) = device(Vendor::Smc);
    pm.trigger_pm1_event(BM_STS as u16);
    assert!(pm.sci_level());
    assert_eq!(rec.count(Event::Isa(9, true)), 1);

    let (mut intel, _rec, _clock) = device(Vendor::Intel);
    intel.trigger_pm1_event(BM_STS as u16);
    assert!(!intel.sci_level());
}

#[test]
fn window_offsets_wrap_at_window_size() {
    for vendor in Vendor::ALL {
        let (mut pm, _rec, _clock) = device(vendor);
        write16(&mut pm, 0x02, 0x0121);
        write16(&mut pm, 0x04, SCI_EN as u16);
        pm.trigger_power_button();

        let len = vendor.window_len();
        for off in 0..len {
            let direct = pm.port_read(BASE + off, 1);
            let mirrored = pm.port_read(BASE + len + off, 1);
            assert_eq!(direct, mirrored, "{vendor:?} offset {off:#x}");
        }
    }
}

#[test]
fn multi_byte_access_composes_little_endian() {
    let (mut pm, _rec, _clock) = device(Vendor::Intel);
    write16(&mut pm, 0x02, 0x0121);
    assert_eq!(read32(&mut pm, 0x00), (0x0121 << 16) | WAK_STS);

    // A dword write over PMSTS/PMEN clears status and programs enables together.
    write32(&mut pm, 0x00, 0x0100_8000);
    assert_eq!(pm.regs().pmsts, 0);
    assert_eq!(pm.regs().pmen, 0x0100);
}

#[test]
fn unknown_offsets_read_zero_and_ignore_writes() {
    let (mut pm, _rec, _clock) = device(Vendor::Intel);
    write8(&mut pm, 0x3F, 0xAA);
    assert_eq!(read8(&mut pm, 0x3F), 0);
    assert_eq!(read8(&mut pm, 0x06), 0);
}

#[test]
fn rtc_status_reads_through_pm1_status_and_clears_on_write() {
    let (mut pm, _rec, _clock) = device(Vendor::Via596b);
    pm.set_rtc_status(true);
    assert_eq!(read8(&mut pm, 0x01) & 0x04, 0x04);

    write8(&mut pm, 0x01, 0x04);
    assert!(!pm.rtc_status());
    assert_eq!(read8(&mut pm, 0x01) & 0x04, 0);
}

#[test]
fn intel_global_status_synthesizes_summary_bits() {
    let (mut pm, _rec, _clock) = device(Vendor::Intel);
    // WAK_STS is latched at power on.
    assert_eq!(read8(&mut pm, 0x18), 0x40);

    pm.apm_command(false);
    assert_eq!(read8(&mut pm, 0x18), 0x60);

    write8(&mut pm, 0x18, 0xFF);
    write16(&mut pm, 0x00, 0xFFFF);
    assert_eq!(read8(&mut pm, 0x18), 0);
}

#[test]
fn intel_pcntrl_bit17_survives_zero_write() {
    let (mut pm, _rec, _clock) = device(Vendor::Intel);
    write32(&mut pm, 0x10, 0x0002_0000);
    write8(&mut pm, 0x12, 0x00);
    assert_eq!(read32(&mut pm, 0x10), 0x0002_0000);
}

#[test]
fn intel_gpio_registers_answer_byte_accesses_only() {
    let cfg = AcpiPmConfig {
        gpireg2_default: 0x5A,
        gporeg_defaults: [1, 2, 3, 4],
        ..AcpiPmConfig::for_vendor(Vendor::Intel)
    };
    let (mut pm, _rec, _clock) = device_with(cfg);
    assert_eq!(read8(&mut pm, 0x30), 0xFF);
    assert_eq!(read8(&mut pm, 0x32), 0x5A);
    assert_eq!(read8(&mut pm, 0x36), 3);
    assert_eq!(read16(&mut pm, 0x34), 0);

    write16(&mut pm, 0x34, 0xBEEF);
    assert_eq!(pm.regs().gporeg, [1, 2, 3, 4]);
    write8(&mut pm, 0x35, 0x77);
    assert_eq!(pm.regs().gporeg, [1, 0x77, 3, 4]);
}

#[test]
fn intel_device_control_write_notifies_trap_config() {
    let (mut pm, rec, _clock) = device(Vendor::Intel);
    write8(&mut pm, 0x2C, 0x01);
    assert_eq!(rec.count(Event::TrapChanged), 1);
}

#[test]
fn intel_bios_release_sets_gbl_sts_and_raises_sci() {
    let (mut pm, rec, _clock) = device(Vendor::Intel);
    write16(&mut pm, 0x02, 0x0020);
    // GLBCTL.BIOS_RLS
    write8(&mut pm, 0x28, 0x02);
    assert_ne!(pm.regs().pmsts & GBL_STS, 0);
    assert!(pm.sci_level());
    assert_eq!(rec.count(Event::Isa(9, true)), 1);

    // Clearing GBL_STS drops the firmware-side release.
    write8(&mut pm, 0x00, GBL_STS as u8);
    assert_eq!(pm.regs().glbctl & 0x02, 0);
}

#[test]
fn intel_gbl_rls_raises_smi_when_bios_enabled() {
    let (mut pm, rec, _clock) = device(Vendor::Intel);
    write8(&mut pm, 0x28, 0x01);
    write16(&mut pm, 0x20, 0x0002);
    write8(&mut pm, 0x04, 0x04);
    assert_eq!(pm.regs().glbsts & 0x01, 0x01);
    assert_eq!(rec.smi_count(), 1);
}

#[test]
fn ali_pcntrl_reads_back_sixteen_bits_wide() {
    let (mut pm, _rec, _clock) = device(Vendor::Ali);
    write32(&mut pm, 0x10, 0x0002_001E);
    assert_eq!(pm.regs().pcntrl, 0x0002_001E);
    assert_eq!(read8(&mut pm, 0x12), 0x1E);
    assert_eq!(read32(&mut pm, 0x10), 0x001E_001E);
}

#[test]
fn ali_gpe1_enable_takes_other_byte_from_gpe0() {
    let (mut pm, _rec, _clock) = device(Vendor::Ali);
    write16(&mut pm, 0x1A, 0x0D07);
    write8(&mut pm, 0x1E, 0x01);
    assert_eq!(pm.regs().gpen1, 0x0C01);
}

#[test]
fn ali_soft_smi_status_read_forces_the_flag() {
    let (mut pm, rec, _clock) = device(Vendor::Ali);
    pm.ali_soft_smi_status_write(0);
    assert!(!pm.regs().ali_soft_smi);

    // Reading reports 1 and latches the flag, whatever it held before.
    assert_eq!(pm.ali_soft_smi_status_read(), 1);
    assert!(pm.regs().ali_soft_smi);

    pm.ali_soft_smi_status_write(0);
    pm.apm_command(true);
    assert!(pm.regs().ali_soft_smi);
    assert_eq!(rec.smi_count(), 1);
}

#[test]
fn via_smi_lock_suppresses_nested_smi_until_released() {
    let (mut pm, rec, _clock) = device(Vendor::Via586b);
    // GLBEN: SMI command port enable.
    write8(&mut pm, 0x2A, 0x40);
    // GLBCTL: SMI_EN | SMI_LOCK
    write8(&mut pm, 0x2C, 0x11);

    write8(&mut pm, 0x2F, 0x55);
    assert_eq!(rec.smi_count(), 1);
    assert!(pm.smi_active());
    assert_eq!(read8(&mut pm, 0x2F), 0x55);
    assert_ne!(read8(&mut pm, 0x28) & 0x40, 0);

    write8(&mut pm, 0x2F, 0x56);
    assert_eq!(rec.smi_count(), 1);

    // Acknowledge SMI_ACTIVE.
    write8(&mut pm, 0x2D, 0x01);
    assert!(!pm.smi_active());
    write8(&mut pm, 0x2F, 0x57);
    assert_eq!(rec.smi_count(), 2);
}

#[test]
fn via_smi_command_port_ignores_wide_accesses() {
    let (mut pm, _rec, _clock) = device(Vendor::Via596b);
    write8(&mut pm, 0x2F, 0x12);
    pm.port_write(BASE + 0x2E, 2, 0x3400);
    assert_eq!(pm.regs().smicmd, 0x12);
    assert_eq!(pm.port_read(BASE + 0x2E, 2) >> 8, 0);
}

#[test]
fn via_pad_enable_write_notifies_trap_config() {
    let (mut pm, rec, _clock) = device(Vendor::Via596b);
    write32(&mut pm, 0x34, 0xFFFF_FFFF);
    assert_eq!(pm.regs().paden, 0x07FF);
    assert_eq!(rec.count(Event::TrapChanged), 4);
}

#[test]
fn via_596b_gpio_ports_reset_to_board_defaults() {
    let (mut pm, _rec, _clock) = device(Vendor::Via596b);
    assert_eq!(read32(&mut pm, 0x48), 0xFFF5_7FC1);
    assert_eq!(read32(&mut pm, 0x4C), 0x7FFF_FFFF);

    write32(&mut pm, 0x4C, 0);
    pm.reset();
    assert_eq!(read32(&mut pm, 0x4C), 0x7FFF_FFFF);
}

#[test]
fn via_586b_gpio_drives_i2c_lines() {
    let rec = util::Recorder::new();
    let i2c = util::FakeI2c::new(&rec);
    let mut callbacks = util::callbacks(&rec);
    callbacks.i2c = Some(Box::new(i2c.clone()));
    let mut pm = aero_acpi_pm::AcpiPm::new_with_callbacks_and_clock(
        AcpiPmConfig::for_vendor(Vendor::Via586b),
        callbacks,
        aero_acpi_pm::clock::ManualClock::new(),
    )
    .unwrap();

    // SCL and SDA as outputs, both low.
    write8(&mut pm, 0x40, 0x06);
    assert_eq!(rec.take(), vec![Event::I2c(false, false)]);
    write8(&mut pm, 0x42, 0x02);
    assert_eq!(rec.take(), vec![Event::I2c(true, false)]);

    // Inputs read back the bus; outputs read as low.
    write8(&mut pm, 0x40, 0x00);
    i2c.force(true, false);
    assert_eq!(read8(&mut pm, 0x44) & 0x06, 0x02);
}

#[test]
fn smc_aux_window_controls_bios_release() {
    let (mut pm, rec, _clock) = device(Vendor::Smc);
    write16(&mut pm, 0x02, 0x0020);

    pm.aux_port_write(util::AUX_BASE + 0x07, 1, 0x01);
    assert_ne!(pm.regs().pmsts & GBL_STS, 0);
    assert!(pm.sci_level());
    assert_eq!(rec.count(Event::Isa(9, true)), 1);

    pm.aux_port_write(util::AUX_BASE + 0x02, 2, 0xFFFF);
    assert_eq!(pm.aux_port_read(util::AUX_BASE + 0x02, 2), 0x3FFF);
    pm.aux_port_write(util::AUX_BASE + 0x06, 1, 0xFF);
    assert_eq!(pm.aux_port_read(util::AUX_BASE + 0x06, 1), 0x03);
    // The window repeats every eight ports.
    assert_eq!(pm.aux_port_read(util::AUX_BASE + 0x0E, 1), 0x03);
}

#[test]
fn smc_aux_status_port_reads_processor_control() {
    let (mut pm, _rec, _clock) = device(Vendor::Smc);
    assert_eq!(pm.aux_port_read(util::AUX_BASE, 2), 0);
}

#[test]
fn aux_window_floats_on_vendors_without_one() {
    let (mut pm, _rec, _clock) = device(Vendor::Intel);
    assert_eq!(pm.aux_port_read(util::AUX_BASE, 1), 0xFF);
    pm.aux_port_write(util::AUX_BASE + 7, 1, 0x01);
    assert_eq!(pm.regs().pmsts & GBL_STS, 0);
}

#[test]
fn ich2_tco_window_reads_zero_without_tco() {
    let (mut pm, _rec, _clock) = device(Vendor::IntelIch2);
    write8(&mut pm, 0x60, 0xFF);
    assert_eq!(read8(&mut pm, 0x60), 0);
}

#[test]
fn ich2_apm_command_sets_apm_status_and_raises_smi() {
    let (mut pm, rec, _clock) = device(Vendor::IntelIch2);
    pm.apm_command(true);
    assert_ne!(pm.regs().smi_sts & 0x20, 0);
    assert_eq!(rec.smi_count(), 0);

    write8(&mut pm, 0x30, 0x21);
    assert_eq!(rec.count(Event::ApmSmiEnabled(true)), 1);
    pm.apm_command(true);
    assert_eq!(rec.smi_count(), 1);
}

#[test]
fn ich2_bios_release_latches_global_status() {
    let (mut pm, rec, _clock) = device(Vendor::IntelIch2);
    rec.take();

    // SMI_EN.BIOS_RLS is a strobe: it is not stored.
    write8(&mut pm, 0x30, 0x80);
    assert_ne!(pm.regs().glbsts & 0x20, 0);
    assert_eq!(read8(&mut pm, 0x30), 0);
    assert_eq!(rec.count(Event::ApmSmiEnabled(false)), 1);
    assert!(!pm.sci_level());
    assert_eq!(rec.count(Event::Isa(9, true)), 0);

    write16(&mut pm, 0x02, PWRBTN_EN as u16);
    pm.trigger_power_button();
    assert!(pm.sci_level());

    // Control writes re-evaluate SCI while the release is latched.
    write8(&mut pm, 0x04, SCI_EN as u8);
    assert!(pm.sci_level());
    assert_ne!(pm.regs().glbsts & 0x20, 0);
    assert_eq!(rec.count(Event::Isa(9, true)), 1);

    write8(&mut pm, 0x01, (PWRBTN_STS >> 8) as u8);
    assert!(!pm.sci_level());
    assert_eq!(rec.events().last(), Some(&Event::Isa(9, false)));
}

#[test]
fn reset_restores_defaults_and_drops_sci() {
    let (mut pm, rec, _clock) = device(Vendor::Intel);
    write16(&mut pm, 0x02, PWRBTN_EN as u16);
    pm.trigger_power_button();
    assert!(pm.sci_level());

    pm.reset();
    assert!(!pm.sci_level());
    assert_eq!(pm.regs().pmsts, WAK_STS);
    assert_eq!(pm.regs().pmen, 0);
    assert_eq!(rec.events().last(), Some(&Event::Isa(9, false)));
}

/// Read/write registers free of side effects, per vendor: (offset, width, writable mask).
fn plain_rw_registers(vendor: Vendor) -> &'static [(u16, u8, u32)] {
    match vendor {
        Vendor::Ali => &[(0x02, 2, 0x0521), (0x1A, 2, 0x0D07)],
        Vendor::Intel => &[(0x02, 2, 0x0521), (0x0E, 2, 0x0F01), (0x20, 2, 0x8D1F)],
        Vendor::IntelIch2 => &[
            (0x02, 2, 0x0521),
            (0x10, 4, 0x0002_01FE),
            (0x2A, 2, 0x097D),
            (0x40, 2, 0x097D),
            (0x4C, 2, 0x097D),
        ],
        Vendor::Via586b => &[
            (0x02, 2, 0x0521),
            (0x10, 4, 0x1E),
            (0x22, 2, 0x03FF),
            (0x24, 2, 0x03FF),
            (0x26, 2, 0x0701),
            (0x2A, 2, 0x007F),
            (0x38, 4, 0xD9),
            (0x46, 2, 0xFFFF),
        ],
        Vendor::Via596b => &[
            (0x02, 2, 0x0521),
            (0x2A, 2, 0xFDFF),
            (0x4C, 4, 0x7FFF_FFFF),
        ],
        Vendor::Smc => &[(0x02, 2, 0x0521)],
    }
}

fn any_vendor() -> impl Strategy<Value = Vendor> {
    prop::sample::select(Vendor::ALL.to_vec())
}

proptest! {
    #[test]
    fn sci_level_matches_status_and_enable(
        vendor in any_vendor(),
        status in any::<u16>(),
        enable in any::<u16>(),
    ) {
        let (mut pm, _rec, _clock) = device(vendor);
        write16(&mut pm, 0x02, enable);
        pm.trigger_pm1_event(status);

        let sts = u32::from(status) | WAK_STS;
        let en = u32::from(enable) & 0x0521;
        let mut expected = sts & en != 0;
        if vendor == Vendor::Smc {
            expected |= sts & BM_STS != 0;
        }
        prop_assert_eq!(pm.sci_level(), expected);
    }

    #[test]
    fn writes_keep_only_writable_bits(
        vendor in any_vendor(),
        idx in any::<prop::sample::Index>(),
        value in any::<u32>(),
    ) {
        let regs = plain_rw_registers(vendor);
        let (off, width, mask) = regs[idx.index(regs.len())];
        let (mut pm, _rec, _clock) = device(vendor);

        let width_mask = if width == 4 { u32::MAX } else { 0xFFFF };
        pm.port_write(BASE + off, width, value);
        prop_assert_eq!(pm.port_read(BASE + off, width), value & mask & width_mask);
    }

    #[test]
    fn status_clear_never_sets_bits(vendor in any_vendor(), value in any::<u16>()) {
        let (mut pm, _rec, _clock) = device(vendor);
        pm.trigger_pm1_event(0xFFFF);
        let before = pm.regs().pmsts;
        write16(&mut pm, 0x00, value);
        let after = pm.regs().pmsts;
        prop_assert_eq!(after & !before, 0);
        prop_assert_eq!(after, before & !(u32::from(value) & 0x8D31));
    }
}

//! Check a device against its stock state and reset it
//!
//! The flow makes at most two passes over the device:
//!
//! 1. Read flash, EEPROM and fuses and report how they compare to stock
//! 2. Erase the chip if flash or EEPROM are used, write the stock fuses if
//!    they were modified
//! 3. Read everything once more and report whether the reset worked
//!
//! There is no retry beyond the second read.

use fusereset_core::database::{DeviceDb, DeviceRecord};
use fusereset_core::hexdump::hexdump;
use fusereset_core::programmer::Programmer;
use fusereset_core::stock::{self, StockStatus};
use fusereset_core::{FuseMap, Snapshot};
use std::io::Write;

/// Options for a reset run
#[derive(Debug, Clone, Copy, Default)]
pub struct ResetOptions {
    /// 1: status lines, 3: hex dumps of used memory
    pub verbose: u8,
    /// Report only, leave the device untouched
    pub no_erase: bool,
}

/// How a reset run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    /// Device was already stock, nothing done
    AlreadyStock,
    /// Device differs from stock but changes were disabled
    ReadOnly,
    /// Device was reset and now matches stock
    Reset,
    /// Device was reset but still differs from stock
    ResetFailed,
}

/// Look up `device` and run the reset flow on the programmer built for it
///
/// `connect` is only called once the device is known to the database.
pub fn run<P, F, W>(
    db: &DeviceDb,
    device: &str,
    options: &ResetOptions,
    connect: F,
    out: &mut W,
) -> Result<ResetOutcome, Box<dyn std::error::Error>>
where
    P: Programmer,
    F: FnOnce(&DeviceRecord) -> P,
    W: Write,
{
    let record = db.device(device)?;
    log::info!("Using part {} for {}", record.minipro_name, device);

    let mut programmer = connect(record);
    run_reset(&mut programmer, &record.stock_config, options, out)
}

/// Run the check, erase and re-check flow against a stock fuse baseline
pub fn run_reset<P, W>(
    programmer: &mut P,
    stock: &FuseMap,
    options: &ResetOptions,
    out: &mut W,
) -> Result<ResetOutcome, Box<dyn std::error::Error>>
where
    P: Programmer + ?Sized,
    W: Write,
{
    let (snapshot, status) = check_device(programmer, stock, out)?;

    if options.verbose >= 3 {
        dump_used_memory(&snapshot, &status, out)?;
    }

    if !status.config && options.verbose >= 1 {
        writeln!(out, "Modified fuses:")?;
        for diff in stock::fuse_diff(&snapshot.config, stock) {
            writeln!(out, "{}", diff)?;
        }
    }

    if status.is_stock() {
        return Ok(ResetOutcome::AlreadyStock);
    }
    if options.no_erase {
        log::info!("Read-only mode, leaving device untouched");
        return Ok(ResetOutcome::ReadOnly);
    }

    if status.needs_erase() {
        if options.verbose >= 1 {
            writeln!(out, "Erasing device...")?;
        }
        programmer.erase_all()?;
    }

    if !status.config {
        if options.verbose >= 1 {
            writeln!(out, "Restoring stock fuses...")?;
        }
        programmer.write_config(stock)?;
    }

    if options.verbose >= 1 {
        writeln!(out, "Re-reading device...")?;
    }
    let (_, status) = check_device(programmer, stock, out)?;

    if status.is_stock() {
        if options.verbose >= 1 {
            writeln!(out, "Device reset successful.")?;
        }
        Ok(ResetOutcome::Reset)
    } else {
        writeln!(out, "Device reset FAILED, some parts still modified.")?;
        Ok(ResetOutcome::ResetFailed)
    }
}

/// Read the device, compare it against stock and print the summary line
fn check_device<P, W>(
    programmer: &mut P,
    stock: &FuseMap,
    out: &mut W,
) -> Result<(Snapshot, StockStatus), Box<dyn std::error::Error>>
where
    P: Programmer + ?Sized,
    W: Write,
{
    let snapshot = programmer.read_snapshot()?;
    let status = stock::check(&snapshot, stock);
    log::debug!("Stock status: {:?}", status);

    writeln!(out, "{}", status.summary_line())?;
    Ok((snapshot, status))
}

fn dump_used_memory<W: Write>(
    snapshot: &Snapshot,
    status: &StockStatus,
    out: &mut W,
) -> std::io::Result<()> {
    if !status.code {
        writeln!(out, "Flash contents:")?;
        write!(out, "{}", hexdump(&snapshot.code))?;
    }
    if !status.data {
        writeln!(out, "EEPROM contents:")?;
        write!(out, "{}", hexdump(&snapshot.data))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fusereset_core::{Area, Error};
    use fusereset_dummy::{Call, DummyDevice};

    fn fuses(entries: &[(&str, u64)]) -> FuseMap {
        entries
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect()
    }

    fn atmega8_stock() -> FuseMap {
        fuses(&[("LOCK", 0x3f), ("FUSE", 0xe1)])
    }

    fn db() -> DeviceDb {
        DeviceDb::from_records([(
            "atmega8".to_string(),
            DeviceRecord {
                minipro_name: "ATMEGA8".to_string(),
                stock_config: atmega8_stock(),
            },
        )])
        .unwrap()
    }

    fn reset(dev: &mut DummyDevice, options: ResetOptions) -> (ResetOutcome, String) {
        let mut out = Vec::new();
        let outcome = run_reset(dev, &atmega8_stock(), &options, &mut out).unwrap();
        (outcome, String::from_utf8(out).unwrap())
    }

    fn verbose(level: u8) -> ResetOptions {
        ResetOptions {
            verbose: level,
            no_erase: false,
        }
    }

    const FULL_READ: [Call; 3] = [
        Call::Read(Area::Code),
        Call::Read(Area::Data),
        Call::Read(Area::Config),
    ];

    #[test]
    fn test_stock_device_untouched() {
        let mut dev = DummyDevice::with_fuses(atmega8_stock());
        let (outcome, output) = reset(&mut dev, verbose(0));

        assert_eq!(outcome, ResetOutcome::AlreadyStock);
        assert_eq!(output, "Flash empty   EEPROM empty   Fuses default\n");
        assert_eq!(dev.calls(), &FULL_READ);
    }

    #[test]
    fn test_modified_fuses_restored() {
        let mut dev = DummyDevice::with_fuses(fuses(&[("LOCK", 0x2f), ("FUSE", 0xe1)]));
        let (outcome, output) = reset(&mut dev, verbose(1));

        assert_eq!(outcome, ResetOutcome::Reset);
        assert_eq!(
            output,
            "Flash empty   EEPROM empty   Fuses MODIFIED\n\
             Modified fuses:\n\
             Fuse LOCK: has 0x2f, stock is 0x3f (XOR 0x10)\n\
             Restoring stock fuses...\n\
             Re-reading device...\n\
             Flash empty   EEPROM empty   Fuses default\n\
             Device reset successful.\n"
        );

        let mut expected = FULL_READ.to_vec();
        expected.push(Call::WriteConfig(atmega8_stock()));
        expected.extend(FULL_READ);
        assert_eq!(dev.calls(), expected.as_slice());
        assert_eq!(dev.fuses(), &atmega8_stock());
    }

    #[test]
    fn test_used_flash_erased_without_fuse_write() {
        let mut dev = DummyDevice::with_fuses(atmega8_stock());
        dev.code_mut()[100] = 0x0c;
        dev.data_mut()[3] = 0x00;
        let (outcome, output) = reset(&mut dev, verbose(0));

        assert_eq!(outcome, ResetOutcome::Reset);
        assert_eq!(
            output,
            "Flash USED   EEPROM USED   Fuses default\n\
             Flash empty   EEPROM empty   Fuses default\n"
        );

        let mut expected = FULL_READ.to_vec();
        expected.push(Call::Erase);
        expected.extend(FULL_READ);
        assert_eq!(dev.calls(), expected.as_slice());
    }

    #[test]
    fn test_erase_status_lines() {
        let mut dev = DummyDevice::with_fuses(atmega8_stock());
        dev.code_mut()[0] = 0x00;
        let (outcome, output) = reset(&mut dev, verbose(1));

        assert_eq!(outcome, ResetOutcome::Reset);
        assert_eq!(
            output,
            "Flash USED   EEPROM empty   Fuses default\n\
             Erasing device...\n\
             Re-reading device...\n\
             Flash empty   EEPROM empty   Fuses default\n\
             Device reset successful.\n"
        );
    }

    #[test]
    fn test_fuse_write_that_does_not_stick() {
        let mut dev = DummyDevice::with_fuses(fuses(&[("LOCK", 0x2f), ("FUSE", 0xe1)]));
        dev.break_write();
        let (outcome, output) = reset(&mut dev, verbose(1));

        assert_eq!(outcome, ResetOutcome::ResetFailed);
        assert_eq!(
            output,
            "Flash empty   EEPROM empty   Fuses MODIFIED\n\
             Modified fuses:\n\
             Fuse LOCK: has 0x2f, stock is 0x3f (XOR 0x10)\n\
             Restoring stock fuses...\n\
             Re-reading device...\n\
             Flash empty   EEPROM empty   Fuses MODIFIED\n\
             Device reset FAILED, some parts still modified.\n"
        );

        let mut expected = FULL_READ.to_vec();
        expected.push(Call::WriteConfig(atmega8_stock()));
        expected.extend(FULL_READ);
        assert_eq!(dev.calls().len(), 7);
        assert_eq!(dev.calls(), expected.as_slice());
    }

    #[test]
    fn test_no_erase_is_read_only() {
        let mut dev = DummyDevice::with_fuses(fuses(&[("LOCK", 0x2f), ("FUSE", 0xe1)]));
        dev.code_mut()[0] = 0x00;
        let options = ResetOptions {
            verbose: 0,
            no_erase: true,
        };
        let (outcome, output) = reset(&mut dev, options);

        assert_eq!(outcome, ResetOutcome::ReadOnly);
        assert_eq!(output, "Flash USED   EEPROM empty   Fuses MODIFIED\n");
        assert_eq!(dev.calls(), &FULL_READ);
        assert_eq!(dev.code()[0], 0x00);
    }

    #[test]
    fn test_failure_reported_without_verbosity() {
        let mut dev = DummyDevice::with_fuses(fuses(&[("LOCK", 0x2f), ("FUSE", 0xe1)]));
        dev.code_mut()[0] = 0x00;
        dev.break_erase();
        let (outcome, output) = reset(&mut dev, verbose(0));

        assert_eq!(outcome, ResetOutcome::ResetFailed);
        assert_eq!(
            output,
            "Flash USED   EEPROM empty   Fuses MODIFIED\n\
             Flash USED   EEPROM empty   Fuses default\n\
             Device reset FAILED, some parts still modified.\n"
        );
        // One erase and one re-check, no further attempts
        assert_eq!(dev.calls().len(), 8);
        assert_eq!(dev.calls()[3], Call::Erase);
        assert_eq!(dev.calls()[4], Call::WriteConfig(atmega8_stock()));
    }

    #[test]
    fn test_fuse_diff_lists_unknown_and_missing() {
        let mut dev = DummyDevice::with_fuses(fuses(&[("FUSE", 0xe1), ("EXTRA", 0x07)]));
        let options = ResetOptions {
            verbose: 1,
            no_erase: true,
        };
        let (_, output) = reset(&mut dev, options);

        assert_eq!(
            output,
            "Flash empty   EEPROM empty   Fuses MODIFIED\n\
             Modified fuses:\n\
             Fuse EXTRA: has 0x07, not in stock config\n\
             Fuse LOCK: missing, stock is 0x3f\n"
        );
    }

    #[test]
    fn test_hex_dump_of_used_memory() {
        let mut dev = DummyDevice::with_fuses(atmega8_stock());
        dev.data_mut()[0] = b'A';
        let options = ResetOptions {
            verbose: 3,
            no_erase: true,
        };
        let (_, output) = reset(&mut dev, options);

        assert!(!output.contains("Flash contents:"));
        assert!(output.contains("EEPROM contents:\n00000000  41 ff"));
        assert!(output.contains("|A...............|"));
        assert!(output.ends_with("00000200\n"));
    }

    #[test]
    fn test_read_failure_aborts() {
        let mut dev = DummyDevice::with_fuses(atmega8_stock());
        dev.fail_reads_of(Area::Config);
        let mut out = Vec::new();

        let err = run_reset(&mut dev, &atmega8_stock(), &verbose(1), &mut out).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::ReadFailed {
                area: Area::Config,
                ..
            })
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn test_run_looks_up_device() {
        let mut out = Vec::new();
        let mut dev = DummyDevice::with_fuses(atmega8_stock());
        let dev_ref = &mut dev;

        let outcome = run(
            &db(),
            "ATmega8",
            &verbose(0),
            move |record| {
                assert_eq!(record.minipro_name, "ATMEGA8");
                dev_ref
            },
            &mut out,
        )
        .unwrap();

        assert_eq!(outcome, ResetOutcome::AlreadyStock);
        assert_eq!(dev.calls(), &FULL_READ);
    }

    #[test]
    fn test_unknown_device_never_connects() {
        let mut out = Vec::new();
        let mut connected = false;

        let err = run(
            &db(),
            "pic16f84",
            &verbose(1),
            |_| {
                connected = true;
                DummyDevice::with_fuses(FuseMap::new())
            },
            &mut out,
        )
        .unwrap_err();

        assert!(!connected);
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::UnknownDevice(name)) if name == "pic16f84"
        ));
        assert_eq!(err.to_string(), "Unknown device 'pic16f84'");
        assert!(out.is_empty());
    }
}

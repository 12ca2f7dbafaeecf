//! CSV export for run step records.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::types::StepRecord;

/// Column header for CSV telemetry export.
const HEADER: &str = "timestep,time,price,temperature_c,energy_saving_mode,\
                       temperature_regulation_active,night_mode,used_today_kwh,\
                       reported_used_kwh,consumption_kwh,devices_on,devices_shed";

/// Exports step records to a CSV file at the given path.
///
/// Produces deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(records: &[StepRecord], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(records, buf)
}

/// Writes step records as CSV to any writer.
///
/// Device lists are joined with `;`.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(records: &[StepRecord], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for r in records {
        wtr.write_record(&[
            r.timestep.to_string(),
            r.time.format("%Y-%m-%dT%H:%M:%S").to_string(),
            format!("{:.4}", r.price),
            format!("{:.2}", r.temperature_c),
            r.energy_saving_mode.to_string(),
            r.temperature_regulation_active.to_string(),
            r.night_mode.to_string(),
            format!("{:.4}", r.used_today_kwh),
            format!("{:.4}", r.reported_used_kwh),
            format!("{:.4}", r.consumption_kwh),
            r.devices_on().join(";"),
            r.shed_devices.join(";"),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

//! CSV export for interval results.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::SimulationOutcome;

/// Column header for interval export.
const HEADER: &str = "timestep,time,demand_kw,pv_kw,wind_kw,other_kw,renewables_kw,\
                       batt_charge_kw,batt_discharge_kw,batt_soc_pct,generator_kw,\
                       grid_import_kw,grid_export_kw,unmet_kw,curtailed_kw";

/// Exports a run's interval results to a CSV file at the given path.
///
/// Writes a header row followed by one data row per interval. Produces
/// deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(outcome: &SimulationOutcome, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(outcome, buf)
}

/// Writes a run's interval results as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(outcome: &SimulationOutcome, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for r in &outcome.intervals {
        let time = outcome.time.get(r.timestep).map_or("", String::as_str);
        wtr.write_record(&[
            r.timestep.to_string(),
            time.to_string(),
            format!("{:.4}", r.demand_kw),
            format!("{:.4}", r.pv_kw),
            format!("{:.4}", r.wind_kw),
            format!("{:.4}", r.other_kw),
            format!("{:.4}", r.renewables_kw),
            format!("{:.4}", r.charge_kw),
            format!("{:.4}", r.discharge_kw),
            format!("{:.4}", r.soc_pct),
            format!("{:.4}", r.generator_kw),
            format!("{:.4}", r.import_kw),
            format!("{:.4}", r.export_kw),
            format!("{:.4}", r.unmet_kw),
            format!("{:.4}", r.curtailed_kw),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

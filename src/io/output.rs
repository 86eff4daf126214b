//! Logging setup and CSV export of simulation results

use crate::ising::ScanPoint;
use color_eyre::eyre::{Result, WrapErr};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{
    fmt::format::Writer, fmt::layer, fmt::time::FormatTime, fmt::writer::BoxMakeWriter,
    layer::SubscriberExt, util::SubscriberInitExt, Registry,
};

/// Timestamps log lines with whole seconds elapsed since logging started
struct ElapsedSeconds {
    start: Instant,
}

impl FormatTime for ElapsedSeconds {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        let secs = self.start.elapsed().as_secs();
        write!(w, "[{:>3}:{:02}:{:02}]", secs / 3600, (secs / 60) % 60, secs % 60)
    }
}

/// Route log output to `output_path`, or stdout when none is given or the
/// file cannot be created.
///
/// A subscriber that is already installed (e.g. by an earlier run in the
/// same process) is left in place.
pub fn setup_output(output_path: Option<&String>) {
    let (writer, ansi, target) = match output_path {
        Some(path) => match File::create(path) {
            Ok(file) => (BoxMakeWriter::new(file), false, path.clone()),
            Err(e) => {
                eprintln!("Could not create log file {}: {}; logging to stdout", path, e);
                (BoxMakeWriter::new(std::io::stdout), true, "stdout".to_string())
            }
        },
        None => (BoxMakeWriter::new(std::io::stdout), true, "stdout".to_string()),
    };

    let fmt_layer = layer()
        .with_writer(writer)
        .with_timer(ElapsedSeconds {
            start: Instant::now(),
        })
        .with_ansi(ansi)
        .with_target(false);

    if Registry::default().with(fmt_layer).try_init().is_ok() {
        info!("ising {} logging to {}", env!("CARGO_PKG_VERSION"), target);
    }
}

/// Open `path` for writing, creating parent directories
pub fn create_output_file(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .wrap_err_with(|| format!("Unable to create directory {}", parent.display()))?;
    }
    let file = File::create(path)
        .wrap_err_with(|| format!("Unable to create output file {}", path.display()))?;
    Ok(BufWriter::new(file))
}

/// Magnetization series as `step,magnetization` CSV
pub fn write_series<W: Write>(writer: &mut W, series: &[f64]) -> Result<()> {
    writeln!(writer, "step,magnetization")?;
    for (step, m) in series.iter().enumerate() {
        writeln!(writer, "{},{:.8}", step, m)?;
    }
    writer.flush()?;
    Ok(())
}

/// Theoretical curve as `thermal_energy,magnetization` CSV
pub fn write_theory_curve<W: Write>(writer: &mut W, curve: &[(f64, f64)]) -> Result<()> {
    writeln!(writer, "thermal_energy,magnetization")?;
    for (t, m) in curve {
        writeln!(writer, "{:.6},{:.8}", t, m)?;
    }
    writer.flush()?;
    Ok(())
}

/// Temperature scan results as CSV
pub fn write_scan_results<W: Write>(writer: &mut W, points: &[ScanPoint]) -> Result<()> {
    writeln!(
        writer,
        "thermal_energy,magnetization,abs_magnetization,std_dev,acceptance_rate,theory"
    )?;
    for p in points {
        writeln!(
            writer,
            "{:.6},{:.8},{:.8},{:.8},{:.6},{:.8}",
            p.thermal_energy,
            p.magnetization,
            p.abs_magnetization,
            p.std_dev,
            p.acceptance_rate,
            p.theory
        )?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_timer_format() {
        let timer = ElapsedSeconds {
            start: Instant::now(),
        };
        let mut out = String::new();
        timer.format_time(&mut Writer::new(&mut out)).unwrap();
        assert_eq!(out, "[  0:00:00]");
    }

    #[test]
    fn test_write_series() {
        let mut buf = Vec::new();
        write_series(&mut buf, &[1.0, -0.5]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "step,magnetization\n0,1.00000000\n1,-0.50000000\n");
    }

    #[test]
    fn test_write_theory_curve() {
        let mut buf = Vec::new();
        write_theory_curve(&mut buf, &[(1.0, 0.999), (4.0, 0.0)]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2], "4.000000,0.00000000");
    }

    #[test]
    fn test_create_output_file_makes_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("series.csv");
        let mut writer = create_output_file(&path).unwrap();
        write_series(&mut writer, &[0.0]).unwrap();
        drop(writer);
        assert!(path.exists());
    }
}

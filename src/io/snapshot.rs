//! Lattice snapshots written by the persist callback
//!
//! Files are named `ising_k{step:06}.{ext}` inside the snapshot directory.
//! PBM snapshots use the plain `P1` variant with black pixels for down spins;
//! XYZ snapshots list every site at its embedded position with the spin as an
//! extra column.

use crate::config::SnapshotFormat;
use crate::ising::{Lattice, LatticeBasis, SnapshotHook, SpinView};
use nalgebra::Vector2;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Plain PBM lines must not exceed this many characters
const PBM_LINE_WIDTH: usize = 70;

pub struct SnapshotWriter {
    dir: PathBuf,
    format: SnapshotFormat,
    positions: Vec<Vector2<f64>>,
    written: Vec<PathBuf>,
}

impl SnapshotWriter {
    /// Creates `dir` if needed and precomputes site positions for XYZ output
    pub fn new(
        dir: impl Into<PathBuf>,
        format: SnapshotFormat,
        lattice: &Lattice,
        basis: &LatticeBasis,
    ) -> io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        let positions = match format {
            SnapshotFormat::Xyz => (0..lattice.n_sites())
                .map(|i| lattice.position(i, basis))
                .collect(),
            SnapshotFormat::Pbm => Vec::new(),
        };
        Ok(Self {
            dir,
            format,
            positions,
            written: Vec::new(),
        })
    }

    pub fn path_for(&self, step: u64) -> PathBuf {
        self.dir
            .join(format!("ising_k{:06}.{}", step, self.format.extension()))
    }

    /// Files written so far, in step order
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn write_file(&self, path: &Path, view: &SpinView<'_>) -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        match self.format {
            SnapshotFormat::Pbm => write_pbm(&mut writer, view)?,
            SnapshotFormat::Xyz => write_xyz(&mut writer, view, &self.positions)?,
        }
        writer.flush()
    }
}

impl SnapshotHook for SnapshotWriter {
    fn persist(&mut self, view: &SpinView<'_>) {
        let path = self.path_for(view.step());
        match self.write_file(&path, view) {
            Ok(()) => {
                debug!("Snapshot written to {}", path.display());
                self.written.push(path);
            }
            Err(e) => warn!("Failed to write snapshot {}: {}", path.display(), e),
        }
    }
}

pub fn write_pbm<W: Write>(writer: &mut W, view: &SpinView<'_>) -> io::Result<()> {
    writeln!(writer, "P1")?;
    writeln!(writer, "# step {} M = {:+.6}", view.step(), view.magnetization())?;
    writeln!(writer, "{} {}", view.side(), view.side())?;
    for row in view.rows() {
        let pixels: Vec<u8> = row
            .iter()
            .map(|&s| if s < 0 { b'1' } else { b'0' })
            .collect();
        for line in pixels.chunks(PBM_LINE_WIDTH) {
            writer.write_all(line)?;
            writer.write_all(b"\n")?;
        }
    }
    Ok(())
}

pub fn write_xyz<W: Write>(
    writer: &mut W,
    view: &SpinView<'_>,
    positions: &[Vector2<f64>],
) -> io::Result<()> {
    let spins = view.as_slice();
    if positions.len() != spins.len() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "{} positions for {} spins",
                positions.len(),
                spins.len()
            ),
        ));
    }

    writeln!(writer, "{}", spins.len())?;
    writeln!(
        writer,
        "step={} magnetization={:.6}",
        view.step(),
        view.magnetization()
    )?;
    for (pos, &s) in positions.iter().zip(spins) {
        let label = if s > 0 { "U" } else { "D" };
        writeln!(
            writer,
            "{} {:12.6} {:12.6} {:12.6} {:+}",
            label, pos.x, pos.y, 0.0, s
        )?;
    }
    Ok(())
}

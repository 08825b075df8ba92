//! Absorbed-particle statistics sinks
//!
//! The transport core only needs "append one record" and "flush". Where the
//! records end up is decided by the [`RecordSink`] implementation: an
//! in-memory `Vec` per worker during tracing, and a [`TextSink`] writing the
//! tab-separated statistics layout once a batch has been merged.
//!
//! ## Text layout
//!
//! ```text
//! #Number of particles simulated in this run 100000
//! #Surface reflection coefficient 0.900000
//! #Pressure in simulation 5.000000 Pa
//! #Generated 2026-10-16 12:00:00
//! #POS_X	POS_Y	POS_Z	VX	VY	VZ	VolumeCount	SurfaceCount
//! 1.00000000e0	5.12345678e-1	...	3	7
//! ```

use chrono::{DateTime, Local};
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::background::Background;
use crate::batch::BatchReport;
use crate::geometry::Geometry;
use crate::math::Vec3;
use crate::{Result, TracerError};

/// Column header line of the statistics layout
pub const COLUMN_HEADER: &str = "#POS_X\tPOS_Y\tPOS_Z\tVX\tVY\tVZ\tVolumeCount\tSurfaceCount";

/// Final state of one absorbed particle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleRecord {
    /// Absorption point
    pub position: Vec3,
    /// Direction of travel when absorbed
    pub direction: Vec3,
    /// Number of gas-phase collisions during the trace
    pub volume_collisions: u64,
    /// Number of surface collisions during the trace, the absorbing one included
    pub surface_collisions: u64,
}

impl ParticleRecord {
    /// Parse one tab-separated data line
    pub fn parse_line(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 8 {
            return Err(TracerError::Parse(format!(
                "statistics line has {} fields, expected 8", fields.len()
            )));
        }
        let mut values = [0.0; 6];
        for (value, field) in values.iter_mut().zip(&fields) {
            *value = parse_field(field)?;
        }
        Ok(Self {
            position: Vec3::new(values[0], values[1], values[2]),
            direction: Vec3::new(values[3], values[4], values[5]),
            volume_collisions: parse_field(fields[6])?,
            surface_collisions: parse_field(fields[7])?,
        })
    }
}

fn parse_field<T>(field: &str) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    field
        .parse()
        .map_err(|e| TracerError::Parse(format!("field '{}': {}", field, e)))
}

impl fmt::Display for ParticleRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.8e}\t{:.8e}\t{:.8e}\t{:.8e}\t{:.8e}\t{:.8e}\t{}\t{}",
            self.position.x,
            self.position.y,
            self.position.z,
            self.direction.x,
            self.direction.y,
            self.direction.z,
            self.volume_collisions,
            self.surface_collisions
        )
    }
}

/// Append-only destination for absorbed-particle records
pub trait RecordSink {
    /// Append one record
    fn append(&mut self, record: &ParticleRecord) -> Result<()>;

    /// Push any buffered records to the underlying storage
    fn flush(&mut self) -> Result<()>;
}

impl RecordSink for Vec<ParticleRecord> {
    fn append(&mut self, record: &ParticleRecord) -> Result<()> {
        self.push(*record);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Preamble written before a surface's records
#[derive(Debug, Clone)]
pub struct RunHeader {
    /// Particles simulated in the whole run, not only those absorbed here
    pub particles: u64,
    pub reflection_coefficient: f64,
    pub pressure: f64,
    pub created: DateTime<Local>,
}

impl RunHeader {
    pub fn new(particles: u64, reflection_coefficient: f64, gas: &Background) -> Self {
        Self {
            particles,
            reflection_coefficient,
            pressure: gas.pressure,
            created: Local::now(),
        }
    }
}

impl fmt::Display for RunHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let created = self.created.format("%Y-%m-%d %H:%M:%S");
        writeln!(
            f,
            "#Number of particles simulated in this run {}",
            self.particles
        )?;
        writeln!(
            f,
            "#Surface reflection coefficient {:.6}",
            self.reflection_coefficient
        )?;
        writeln!(f, "#Pressure in simulation {:.6} Pa", self.pressure)?;
        write!(f, "#Generated {}", created)
    }
}

/// Tab-separated text sink over any writer
pub struct TextSink<W: Write> {
    writer: W,
    written: u64,
}

impl<W: Write> TextSink<W> {
    /// Wrap a writer without emitting anything
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Wrap a writer and emit the run preamble plus the column header
    pub fn with_header(writer: W, header: &RunHeader) -> Result<Self> {
        let mut sink = Self::new(writer);
        writeln!(sink.writer, "{}", header)?;
        writeln!(sink.writer, "{}", COLUMN_HEADER)?;
        Ok(sink)
    }

    /// Number of records appended through this sink
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Flush and return the underlying writer
    pub fn into_inner(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl TextSink<BufWriter<File>> {
    /// Open `path` for appending, as successive runs accumulate in one file
    pub fn append_to_file<P: AsRef<Path>>(path: P, header: &RunHeader) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        Self::with_header(BufWriter::new(file), header)
    }
}

impl<W: Write> RecordSink for TextSink<W> {
    fn append(&mut self, record: &ParticleRecord) -> Result<()> {
        writeln!(self.writer, "{}", record)?;
        self.written += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Read every data record from statistics text, skipping `#` lines
pub fn read_records<R: BufRead>(reader: R) -> Result<Vec<ParticleRecord>> {
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        records.push(ParticleRecord::parse_line(trimmed)?);
    }
    Ok(records)
}

/// Append the merged statistics of every collecting surface to `<dir>/<name>`
///
/// Returns the paths written, in geometry order.
pub fn write_surface_statistics<P: AsRef<Path>>(
    geometry: &Geometry,
    report: &BatchReport,
    gas: &Background,
    dir: P,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir.as_ref())?;
    let mut written = Vec::new();

    for (surface, records) in geometry.surfaces().iter().zip(report.statistics.iter()) {
        if !surface.collects_statistics() {
            continue;
        }
        let path = dir.as_ref().join(surface.name());
        let coefficient = surface.reflector().reflection_coefficient();
        let header = RunHeader::new(report.simulated, coefficient, gas);
        let mut sink = TextSink::append_to_file(&path, &header)?;
        for record in records {
            sink.append(record)?;
        }
        sink.flush()?;
        info!(
            "Wrote {} records for surface '{}' to {}",
            sink.written(), surface.name(), path.display()
        );
        written.push(path);
    }

    Ok(written)
}

//! File exporter for changed rows.

use crate::error::ExportError;
use chrono::Utc;
use csv::Writer;
use southwind_core::{OutputFormat, Row};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default buffer size for file writing.
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Destination for the rows that carry a table's newest change token.
pub trait Exporter {
    /// Prepare per-table destinations before the first export.
    fn prepare(&mut self, tables: &[&str]) -> Result<(), ExportError>;

    /// Write one batch of changed rows for `table`.
    fn export(&mut self, table: &str, rows: &[Row], format: OutputFormat)
        -> Result<(), ExportError>;
}

impl<E: Exporter + ?Sized> Exporter for &mut E {
    fn prepare(&mut self, tables: &[&str]) -> Result<(), ExportError> {
        (**self).prepare(tables)
    }

    fn export(
        &mut self,
        table: &str,
        rows: &[Row],
        format: OutputFormat,
    ) -> Result<(), ExportError> {
        (**self).export(table, rows, format)
    }
}

/// Writes each batch to its own file under `<root>/<table>/`.
///
/// Files are named `<table>-<utc timestamp>-<sequence>.<ext>`; the sequence
/// keeps names unique and ordered within a run.
pub struct FileExporter {
    root: PathBuf,
    sequence: u64,
}

impl FileExporter {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            sequence: 0,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of files written so far.
    pub fn files_written(&self) -> u64 {
        self.sequence
    }

    fn next_path(&mut self, table: &str, format: OutputFormat) -> PathBuf {
        self.sequence += 1;
        let timestamp = Utc::now().format("%Y%m%dT%H%M%S%6f");
        self.root.join(table).join(format!(
            "{table}-{timestamp}-{:06}.{}",
            self.sequence,
            format.extension()
        ))
    }
}

impl Exporter for FileExporter {
    fn prepare(&mut self, tables: &[&str]) -> Result<(), ExportError> {
        for table in tables {
            let dir = self.root.join(table);
            fs::create_dir_all(&dir)?;
            debug!("Prepared output folder {}", dir.display());
        }
        Ok(())
    }

    fn export(
        &mut self,
        table: &str,
        rows: &[Row],
        format: OutputFormat,
    ) -> Result<(), ExportError> {
        fs::create_dir_all(self.root.join(table))?;
        let path = self.next_path(table, format);
        let file = File::create(&path)?;
        let mut writer = BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, file);

        match format {
            OutputFormat::Json => write_json(&mut writer, rows)?,
            OutputFormat::Jsonl => write_jsonl(&mut writer, rows)?,
            OutputFormat::Csv => write_csv(&mut writer, rows)?,
        }
        writer.flush()?;

        info!(
            "Exported {} row(s) of '{}' to {}",
            rows.len(),
            table,
            path.display()
        );
        Ok(())
    }
}

/// A JSON array of row objects.
pub fn write_json<W: Write>(writer: &mut W, rows: &[Row]) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(&mut *writer, rows)?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// One JSON object per line.
pub fn write_jsonl<W: Write>(writer: &mut W, rows: &[Row]) -> Result<(), ExportError> {
    for row in rows {
        serde_json::to_writer(&mut *writer, row)?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

/// A header taken from the first row, then one record per row.
pub fn write_csv<W: Write>(writer: &mut W, rows: &[Row]) -> Result<(), ExportError> {
    let Some(first) = rows.first() else {
        return Ok(());
    };
    let mut csv_writer = Writer::from_writer(writer);
    csv_writer.write_record(first.columns())?;
    for row in rows {
        csv_writer.write_record(row.values().iter().map(|v| v.to_string()))?;
    }
    csv_writer.flush()?;
    Ok(())
}

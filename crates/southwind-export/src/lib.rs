//! Change-feed exporters.
//!
//! Each time a table's newest change token advances, the rows carrying it
//! are handed to an [`Exporter`]. [`FileExporter`] writes them as JSON,
//! JSON Lines or CSV files, one file per batch.
//!
//! # Example
//!
//! ```ignore
//! use southwind_core::OutputFormat;
//! use southwind_export::{Exporter, FileExporter};
//!
//! let mut exporter = FileExporter::new("output");
//! exporter.prepare(&["users"])?;
//! exporter.export("users", &rows, OutputFormat::Jsonl)?;
//! ```

mod error;
pub mod exporter;

pub use error::ExportError;
pub use exporter::{Exporter, FileExporter};

//! Report file generation.
//!
//! Reports are written to `<base>-<yyyy-MM-dd_HH-mm-ss-SSS>.csv` inside an
//! output directory, the system temp directory by default. A file that fails
//! halfway is removed before the error is returned.

use crate::definition::{FormattedRow, ReportDefinition};
use crate::error::ReportError;
use crate::render::{write_rendered, RenderMetrics, ReportRenderer};
use chrono::{Local, NaiveDateTime};
use csv_types::BoxError;
use std::fs::{self, OpenOptions};
use std::io::BufWriter;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

/// Write buffer size for report files.
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Timestamp pattern embedded in generated file names.
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S-%3f";

pub const REPORT_EXTENSION: &str = "csv";

/// A report file written to disk.
#[derive(Debug, Clone)]
pub struct GeneratedReport {
    pub path: PathBuf,
    pub metrics: RenderMetrics,
}

/// Writes reports to timestamped files in an output directory.
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    output_dir: PathBuf,
    buffer_size: usize,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new(std::env::temp_dir())
    }
}

impl ReportGenerator {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Render `rows` into a new report file and return its location.
    pub fn generate_as_file<T, I>(
        &self,
        definition: &ReportDefinition<T>,
        rows: Option<I>,
        base_name: &str,
    ) -> Result<GeneratedReport, ReportError>
    where
        I: IntoIterator<Item = T>,
    {
        let rendered = ReportRenderer::render(definition, rows)?;
        self.write_new_file(rendered, base_name)
    }

    /// Like [`generate_as_file`](Self::generate_as_file) for fallible row sources.
    pub fn try_generate_as_file<T, I, E>(
        &self,
        definition: &ReportDefinition<T>,
        rows: Option<I>,
        base_name: &str,
    ) -> Result<GeneratedReport, ReportError>
    where
        I: IntoIterator<Item = Result<T, E>>,
        E: Into<BoxError>,
    {
        let rendered = ReportRenderer::try_render(definition, rows)?;
        self.write_new_file(rendered, base_name)
    }

    /// Path of the report file for `base_name` at `timestamp`.
    ///
    /// A relative output directory is resolved against the current directory
    /// first. Fails if the resolved path leaves the output directory.
    pub fn report_path(
        &self,
        base_name: &str,
        timestamp: NaiveDateTime,
    ) -> Result<PathBuf, ReportError> {
        let output_dir = std::path::absolute(&self.output_dir)?;
        let dir = normalize_lexically(&output_dir);
        let path = normalize_lexically(&output_dir.join(report_file_name(base_name, timestamp)));
        if !dir.has_root() || !path.starts_with(&dir) || path == dir {
            return Err(ReportError::PathEscape { dir, path });
        }
        Ok(path)
    }

    fn write_new_file<R>(&self, rendered: R, base_name: &str) -> Result<GeneratedReport, ReportError>
    where
        R: Iterator<Item = Result<FormattedRow, ReportError>>,
    {
        let path = self.report_path(base_name, Local::now().naive_local())?;
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)?;
        debug!("Created report file {}", path.display());

        match write_rendered(rendered, BufWriter::with_capacity(self.buffer_size, file)) {
            Ok(metrics) => {
                info!(
                    "Generated report {} with {} rows",
                    path.display(),
                    metrics.rows_written
                );
                Ok(GeneratedReport { path, metrics })
            }
            Err(err) => {
                match fs::remove_file(&path) {
                    Ok(()) => warn!("Removed incomplete report file {}", path.display()),
                    Err(remove_err) => warn!(
                        "Failed to remove incomplete report file {}: {}",
                        path.display(),
                        remove_err
                    ),
                }
                Err(err)
            }
        }
    }
}

/// File name for a report generated at `timestamp`.
pub fn report_file_name(base_name: &str, timestamp: NaiveDateTime) -> String {
    format!(
        "{base_name}-{}.{REPORT_EXTENSION}",
        timestamp.format(FILE_TIMESTAMP_FORMAT)
    )
}

/// Resolve `.` and `..` components without touching the filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

//! Rendering rows through a report definition.
//!
//! [`ReportRenderer`] turns a row source into a lazy sequence of formatted
//! records, header first. [`write_report`] and [`try_write_report`] drain
//! that sequence into any `io::Write` sink.

use crate::definition::{FormattedRow, ReportDefinition};
use crate::error::ReportError;
use csv_types::{BoxError, CsvRecordWriter};
use std::convert::Infallible;
use std::io::Write;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Progress is logged every this many data rows.
const PROGRESS_INTERVAL: u64 = 10_000;

/// Row iterator adapter used for sources that cannot fail.
pub type InfallibleRows<I, T> = std::iter::Map<I, fn(T) -> Result<T, Infallible>>;

/// Entry points for rendering a report.
pub struct ReportRenderer;

impl ReportRenderer {
    /// Render rows through `definition`.
    ///
    /// The definition is validated before anything is produced. An absent
    /// source renders like an empty one: the header alone.
    pub fn render<T, I>(
        definition: &ReportDefinition<T>,
        rows: Option<I>,
    ) -> Result<RenderedRows<'_, T, InfallibleRows<I::IntoIter, T>>, ReportError>
    where
        I: IntoIterator<Item = T>,
    {
        let rows = rows.map(|rows| {
            rows.into_iter()
                .map(Ok::<T, Infallible> as fn(T) -> Result<T, Infallible>)
        });
        Self::try_render(definition, rows)
    }

    /// Render rows from a source that can fail while producing them.
    pub fn try_render<T, I, E>(
        definition: &ReportDefinition<T>,
        rows: Option<I>,
    ) -> Result<RenderedRows<'_, T, I::IntoIter>, ReportError>
    where
        I: IntoIterator<Item = Result<T, E>>,
        E: Into<BoxError>,
    {
        definition.validate()?;
        info!(
            "Rendering report with {} columns",
            definition.columns().len()
        );
        Ok(RenderedRows {
            definition,
            rows: rows.map(IntoIterator::into_iter),
            header_emitted: false,
            next_row: 0,
            failed: false,
        })
    }
}

/// Lazy sequence of formatted records: the header, then one per source row.
///
/// Rows are pulled from the source only as records are requested. After the
/// first error the iterator is exhausted.
pub struct RenderedRows<'a, T, I> {
    definition: &'a ReportDefinition<T>,
    rows: Option<I>,
    header_emitted: bool,
    next_row: usize,
    failed: bool,
}

impl<T, I> RenderedRows<'_, T, I> {
    /// Number of data rows pulled from the source so far.
    pub fn rows_rendered(&self) -> usize {
        self.next_row
    }
}

impl<T, I, E> Iterator for RenderedRows<'_, T, I>
where
    I: Iterator<Item = Result<T, E>>,
    E: Into<BoxError>,
{
    type Item = Result<FormattedRow, ReportError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        if !self.header_emitted {
            self.header_emitted = true;
            return Some(Ok(self.definition.header_row()));
        }

        let row_index = self.next_row;
        let result = match self.rows.as_mut()?.next()? {
            Ok(row) => self
                .definition
                .map_row(&row)
                .map_err(|err| ReportError::from_row_error(row_index, err)),
            Err(source) => Err(ReportError::Source {
                row: row_index,
                source: source.into(),
            }),
        };
        self.next_row += 1;
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}

/// Summary of a completed render.
#[derive(Debug, Clone, Default)]
pub struct RenderMetrics {
    /// Data rows written, header excluded.
    pub rows_written: u64,
    pub total_duration: Duration,
}

impl RenderMetrics {
    pub fn rows_per_second(&self) -> f64 {
        let secs = self.total_duration.as_secs_f64();
        if secs > 0.0 {
            self.rows_written as f64 / secs
        } else {
            0.0
        }
    }
}

/// Render `rows` into `sink` as CSV.
///
/// On failure, records already written to `sink` are left in place.
pub fn write_report<T, I, W>(
    definition: &ReportDefinition<T>,
    rows: Option<I>,
    sink: W,
) -> Result<RenderMetrics, ReportError>
where
    I: IntoIterator<Item = T>,
    W: Write,
{
    let rendered = ReportRenderer::render(definition, rows)?;
    write_rendered(rendered, sink)
}

/// Render rows from a fallible source into `sink` as CSV.
pub fn try_write_report<T, I, E, W>(
    definition: &ReportDefinition<T>,
    rows: Option<I>,
    sink: W,
) -> Result<RenderMetrics, ReportError>
where
    I: IntoIterator<Item = Result<T, E>>,
    E: Into<BoxError>,
    W: Write,
{
    let rendered = ReportRenderer::try_render(definition, rows)?;
    write_rendered(rendered, sink)
}

/// Drain rendered records into `sink`, header first, then flush it.
pub(crate) fn write_rendered<R, W>(rendered: R, sink: W) -> Result<RenderMetrics, ReportError>
where
    R: Iterator<Item = Result<FormattedRow, ReportError>>,
    W: Write,
{
    let start_time = Instant::now();
    let mut writer = CsvRecordWriter::new(sink);
    let mut metrics = RenderMetrics::default();

    for record in rendered {
        let record = record?;
        writer.write_record(record.fields().iter().map(Option::as_deref))?;

        // The first record is the header.
        if writer.records_written() > 1 {
            metrics.rows_written += 1;
            if metrics.rows_written % PROGRESS_INTERVAL == 0 {
                debug!("Written {} rows", metrics.rows_written);
            }
        }
    }
    writer.flush()?;

    metrics.total_duration = start_time.elapsed();
    info!(
        "Report complete: {} rows in {:?} ({:.0} rows/sec)",
        metrics.rows_written,
        metrics.total_duration,
        metrics.rows_per_second()
    );
    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::io;

    fn ids() -> ReportDefinition<i64> {
        ReportDefinition::builder()
            .add_column("Id", |id: &i64| *id)
            .build()
    }

    #[test]
    fn test_header_comes_first() {
        let definition = ids();
        let records: Vec<_> = ReportRenderer::render(&definition, Some(vec![1, 2]))
            .unwrap()
            .map(Result::unwrap)
            .collect();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].get(0), Some("Id"));
        assert_eq!(records[2].get(0), Some("2"));
    }

    #[test]
    fn test_absent_source_renders_header_only() {
        let definition = ids();
        let records: Vec<_> = ReportRenderer::render(&definition, None::<Vec<i64>>)
            .unwrap()
            .collect();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_invalid_definition_fails_before_reading() {
        let definition = ReportDefinition::<i64>::builder().build();
        let pulled = Cell::new(0);
        let source = (0..3).inspect(|_| pulled.set(pulled.get() + 1));
        let result = ReportRenderer::render(&definition, Some(source));
        assert!(result.is_err());
        assert_eq!(pulled.get(), 0);
    }

    #[test]
    fn test_rendering_is_lazy() {
        let definition = ids();
        let pulled = Cell::new(0);
        let source = (0..1_000).inspect(|_| pulled.set(pulled.get() + 1));
        let mut rendered = ReportRenderer::render(&definition, Some(source)).unwrap();

        rendered.next();
        assert_eq!(pulled.get(), 0);
        rendered.next();
        assert_eq!(pulled.get(), 1);
        assert_eq!(rendered.rows_rendered(), 1);
    }

    #[test]
    fn test_source_error_stops_rendering() {
        let definition = ids();
        let source: Vec<Result<i64, io::Error>> =
            vec![Ok(1), Err(io::Error::other("broken")), Ok(3)];
        let mut rendered = ReportRenderer::try_render(&definition, Some(source)).unwrap();

        assert!(rendered.next().unwrap().is_ok());
        assert!(rendered.next().unwrap().is_ok());
        let err = rendered.next().unwrap().unwrap_err();
        assert!(matches!(err, ReportError::Source { row: 1, .. }));
        assert!(rendered.next().is_none());
    }

    #[test]
    fn test_formatter_error_names_row_and_column() {
        let definition = ReportDefinition::<i64>::builder()
            .add_column("Id", |id: &i64| *id)
            .add_typed_column("Created", report_core::ColumnType::EpochSeconds, |ts: &i64| *ts)
            .build();
        let mut rendered =
            ReportRenderer::render(&definition, Some(vec![1_709_467_200, i64::MAX])).unwrap();

        assert!(rendered.next().unwrap().is_ok());
        assert!(rendered.next().unwrap().is_ok());
        match rendered.next().unwrap() {
            Err(ReportError::Formatter { row, column, name, source }) => {
                assert_eq!((row, column), (1, 1));
                assert_eq!(name, "Created");
                assert!(matches!(source, csv_types::FormatError::EpochOutOfRange { .. }));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(rendered.next().is_none());
    }

    #[test]
    fn test_write_report_counts_data_rows() {
        let definition = ids();
        let mut out = Vec::new();
        let metrics = write_report(&definition, Some(vec![5, 6, 7]), &mut out).unwrap();
        assert_eq!(metrics.rows_written, 3);
        assert_eq!(String::from_utf8(out).unwrap(), "Id\n5\n6\n7\n");
    }

    #[test]
    fn test_write_report_extraction_error_names_row() {
        let definition = ReportDefinition::<i64>::builder()
            .try_add_column("Id", |id: &i64| {
                if *id < 0 {
                    Err("negative id")
                } else {
                    Ok(*id)
                }
            })
            .build();
        let mut out = Vec::new();
        let err = write_report(&definition, Some(vec![1, -1]), &mut out).unwrap_err();
        assert_eq!(err.row(), Some(1));
        assert!(err.to_string().contains("negative id"));
    }
}

//! csv-report - render typed record streams into CSV reports.
//!
//! A [`ReportDefinition`] lists output columns, each with a name and an
//! extractor that pulls a [`ReportValue`] out of a row. Values are formatted
//! with the definition's [`FormatConfig`] and encoded as CSV records, header
//! first.
//!
//! # Example
//!
//! ```
//! use csv_report::{write_report, ReportDefinition};
//! use rust_decimal::Decimal;
//!
//! struct Item {
//!     id: i64,
//!     price: Decimal,
//! }
//!
//! let definition = ReportDefinition::builder()
//!     .add_column("Item ID", |item: &Item| item.id)
//!     .add_column("Price", |item: &Item| item.price)
//!     .build();
//!
//! let items = vec![
//!     Item { id: 1, price: Decimal::new(1050, 2) },
//!     Item { id: 2, price: Decimal::new(111, 1) },
//! ];
//!
//! let mut out = Vec::new();
//! write_report(&definition, Some(items), &mut out).unwrap();
//! assert_eq!(String::from_utf8(out).unwrap(), "Item ID,Price\n1,10.5\n2,11.1\n");
//! ```
//!
//! # Modules
//!
//! - [`definition`]: columns, the builder and row mapping
//! - [`render`]: lazy rendering and writing to any `io::Write`
//! - [`generator`]: timestamped report files
//! - [`jsonl`]: JSON Lines rows and field conversion
//! - [`config`]: TOML/YAML definition files

pub mod config;
pub mod definition;
pub mod error;
pub mod generator;
pub mod jsonl;
pub mod render;

pub use chrono_tz::Tz;
pub use csv_types::{
    BoxError, CustomFormatters, FormatConfig, FormatError, DEFAULT_DATE_FORMAT,
    DEFAULT_DATE_TIME_FORMAT,
};
pub use definition::{ColumnSpec, Extractor, FormattedRow, ReportDefinition, ReportDefinitionBuilder};
pub use error::{DefinitionError, ReportError, RowError};
pub use generator::{GeneratedReport, ReportGenerator};
pub use render::{try_write_report, write_report, RenderMetrics, RenderedRows, ReportRenderer};
pub use report_core::{ColumnType, OpaqueValue, ReportValue, ValueKind};

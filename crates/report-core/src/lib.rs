//! Core types for the csv-report framework.
//!
//! This crate provides the foundational types shared by the formatting
//! layer and the report renderer:
//!
//! - [`ReportValue`] - A typed cell value produced by a column extractor
//! - [`ValueKind`] - The concrete runtime kind of a value, used to key custom formatters
//! - [`OpaqueValue`] - Escape hatch for user types that are not built-in variants
//! - [`ColumnType`] - Optional semantic tag on a column (epoch seconds, epoch millis)
//!
//! # Architecture
//!
//! ```text
//! report-core (this crate)
//!    │
//!    ├─── csv-types   (formats ReportValue into CSV field text, escapes fields)
//!    │
//!    └─── csv-report  (column definitions, renderer, file generation, CLI)
//! ```
//!
//! # Example
//!
//! ```rust
//! use report_core::{ReportValue, ValueKind};
//!
//! let value = ReportValue::from("hello");
//! assert_eq!(value.kind(), Some(ValueKind::Text));
//!
//! let missing: ReportValue = Option::<i64>::None.into();
//! assert!(missing.is_null());
//! ```

pub mod types;
pub mod values;

pub use types::ColumnType;
pub use values::{OpaqueValue, ReportValue, ValueKind};

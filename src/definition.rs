//! Report definitions: ordered columns plus formatting configuration.
//!
//! A [`ReportDefinition`] is assembled through [`ReportDefinitionBuilder`].
//! Building never fails; structural problems are reported by
//! [`ReportDefinition::validate`], which every render calls before reading
//! the first row.

use crate::error::{DefinitionError, RowError};
use chrono_tz::Tz;
use csv_types::{format_value, BoxError, FormatConfig};
use report_core::{ColumnType, ReportValue, ValueKind};
use std::any::Any;
use std::fmt;

/// Turns a row into the value of one column.
pub type Extractor<T> = Box<dyn Fn(&T) -> Result<ReportValue, BoxError> + Send + Sync>;

/// One output column.
pub struct ColumnSpec<T> {
    name: String,
    column_type: Option<ColumnType>,
    extractor: Option<Extractor<T>>,
}

impl<T> ColumnSpec<T> {
    pub fn new<F, V>(name: impl Into<String>, column_type: Option<ColumnType>, extractor: F) -> Self
    where
        F: Fn(&T) -> V + Send + Sync + 'static,
        V: Into<ReportValue>,
    {
        Self {
            name: name.into(),
            column_type,
            extractor: Some(Box::new(move |row: &T| -> Result<ReportValue, BoxError> {
                Ok(extractor(row).into())
            })),
        }
    }

    /// Column whose extractor may fail.
    pub fn try_new<F, V, E>(
        name: impl Into<String>,
        column_type: Option<ColumnType>,
        extractor: F,
    ) -> Self
    where
        F: Fn(&T) -> Result<V, E> + Send + Sync + 'static,
        V: Into<ReportValue>,
        E: Into<BoxError>,
    {
        Self {
            name: name.into(),
            column_type,
            extractor: Some(Box::new(move |row: &T| -> Result<ReportValue, BoxError> {
                extractor(row).map(Into::into).map_err(Into::into)
            })),
        }
    }

    /// Column declared without an extractor. Fails validation.
    pub fn without_extractor(name: impl Into<String>, column_type: Option<ColumnType>) -> Self {
        Self {
            name: name.into(),
            column_type,
            extractor: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_type(&self) -> Option<ColumnType> {
        self.column_type
    }

    pub fn has_extractor(&self) -> bool {
        self.extractor.is_some()
    }
}

impl<T> fmt::Debug for ColumnSpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnSpec")
            .field("name", &self.name)
            .field("column_type", &self.column_type)
            .field("has_extractor", &self.extractor.is_some())
            .finish()
    }
}

/// One output record. `None` fields are written as empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormattedRow {
    fields: Vec<Option<String>>,
}

impl FormattedRow {
    pub fn new(fields: Vec<Option<String>>) -> Self {
        Self { fields }
    }

    /// A header row: every field present.
    pub fn header<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: names.into_iter().map(|n| Some(n.into())).collect(),
        }
    }

    pub fn fields(&self) -> &[Option<String>] {
        &self.fields
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.fields.get(index).and_then(|f| f.as_deref())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_fields(self) -> Vec<Option<String>> {
        self.fields
    }
}

impl From<Vec<Option<String>>> for FormattedRow {
    fn from(fields: Vec<Option<String>>) -> Self {
        Self::new(fields)
    }
}

/// Ordered columns and the formatting rules shared by all of them.
pub struct ReportDefinition<T> {
    columns: Vec<ColumnSpec<T>>,
    config: FormatConfig,
}

impl<T> ReportDefinition<T> {
    pub fn builder() -> ReportDefinitionBuilder<T> {
        ReportDefinitionBuilder::new()
    }

    pub fn columns(&self) -> &[ColumnSpec<T>] {
        &self.columns
    }

    pub fn config(&self) -> &FormatConfig {
        &self.config
    }

    /// Check the structure of the definition.
    ///
    /// Columns are checked in order and the first problem wins: the column
    /// list must be non-empty, each name must contain a non-whitespace
    /// character and each column must have an extractor. Date patterns are
    /// checked last.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if self.columns.is_empty() {
            return Err(DefinitionError::EmptyColumns);
        }
        for (index, column) in self.columns.iter().enumerate() {
            if column.name.trim().is_empty() {
                return Err(DefinitionError::InvalidColumnName { index });
            }
            if column.extractor.is_none() {
                return Err(DefinitionError::MissingExtractor { index });
            }
        }
        self.config.validate_patterns()?;
        Ok(())
    }

    /// Column names in declaration order.
    pub fn columns_header(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn header_row(&self) -> FormattedRow {
        FormattedRow::header(self.columns.iter().map(|c| c.name.as_str()))
    }

    /// Extract and format every column of one row.
    pub fn map_row(&self, row: &T) -> Result<FormattedRow, RowError> {
        let mut fields = Vec::with_capacity(self.columns.len());
        for (column, spec) in self.columns.iter().enumerate() {
            let extractor = spec
                .extractor
                .as_ref()
                .ok_or_else(|| RowError::MissingExtractor {
                    column,
                    name: spec.name.clone(),
                })?;
            let value = extractor(row).map_err(|source| RowError::Extraction {
                column,
                name: spec.name.clone(),
                source,
            })?;
            let field = format_value(&value, spec.column_type, &self.config).map_err(|source| {
                RowError::Formatter {
                    column,
                    name: spec.name.clone(),
                    source,
                }
            })?;
            fields.push(field);
        }
        Ok(FormattedRow::new(fields))
    }
}

impl<T> fmt::Debug for ReportDefinition<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportDefinition")
            .field("columns", &self.columns)
            .field("config", &self.config)
            .finish()
    }
}

/// Fluent builder for [`ReportDefinition`].
pub struct ReportDefinitionBuilder<T> {
    columns: Vec<ColumnSpec<T>>,
    config: FormatConfig,
}

impl<T> Default for ReportDefinitionBuilder<T> {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            config: FormatConfig::default(),
        }
    }
}

impl<T> ReportDefinitionBuilder<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_column<F, V>(self, name: impl Into<String>, extractor: F) -> Self
    where
        F: Fn(&T) -> V + Send + Sync + 'static,
        V: Into<ReportValue>,
    {
        self.add_column_spec(ColumnSpec::new(name, None, extractor))
    }

    /// Add a column whose integer values are epoch timestamps.
    pub fn add_typed_column<F, V>(
        self,
        name: impl Into<String>,
        column_type: ColumnType,
        extractor: F,
    ) -> Self
    where
        F: Fn(&T) -> V + Send + Sync + 'static,
        V: Into<ReportValue>,
    {
        self.add_column_spec(ColumnSpec::new(name, Some(column_type), extractor))
    }

    pub fn try_add_column<F, V, E>(self, name: impl Into<String>, extractor: F) -> Self
    where
        F: Fn(&T) -> Result<V, E> + Send + Sync + 'static,
        V: Into<ReportValue>,
        E: Into<BoxError>,
    {
        self.add_column_spec(ColumnSpec::try_new(name, None, extractor))
    }

    pub fn add_column_spec(mut self, spec: ColumnSpec<T>) -> Self {
        self.columns.push(spec);
        self
    }

    pub fn date_time_format(mut self, pattern: impl Into<String>) -> Self {
        self.config.date_time_format = pattern.into();
        self
    }

    pub fn date_format(mut self, pattern: impl Into<String>) -> Self {
        self.config.date_format = pattern.into();
        self
    }

    pub fn timezone(mut self, timezone: Tz) -> Self {
        self.config.timezone = Some(timezone);
        self
    }

    /// Override formatting for every value of `kind`.
    pub fn custom_formatter<F>(self, kind: ValueKind, formatter: F) -> Self
    where
        F: Fn(&ReportValue) -> String + Send + Sync + 'static,
    {
        self.try_custom_formatter(kind, move |value| Ok::<_, BoxError>(formatter(value)))
    }

    pub fn try_custom_formatter<F, E>(mut self, kind: ValueKind, formatter: F) -> Self
    where
        F: Fn(&ReportValue) -> Result<String, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.config
            .custom_formatters
            .insert(kind, move |value| formatter(value).map_err(Into::into));
        self
    }

    /// Override formatting for opaque values of type `V`.
    pub fn opaque_formatter<V, F>(self, formatter: F) -> Self
    where
        V: Any,
        F: Fn(&V) -> String + Send + Sync + 'static,
    {
        self.try_custom_formatter(ValueKind::opaque::<V>(), move |value| {
            value
                .downcast_ref::<V>()
                .map(&formatter)
                .ok_or_else(|| BoxError::from("opaque value has an unexpected type"))
        })
    }

    /// Columns added so far.
    pub fn columns(&self) -> &[ColumnSpec<T>] {
        &self.columns
    }

    pub fn build(self) -> ReportDefinition<T> {
        ReportDefinition {
            columns: self.columns,
            config: self.config,
        }
    }
}

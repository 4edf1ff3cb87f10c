//! Report definition files.
//!
//! A definition file describes a report over JSON rows:
//!
//! ```toml
//! timezone = "Europe/Paris"
//! date_time_format = "%d/%m/%Y %H:%M"
//!
//! [[columns]]
//! name = "Item ID"
//! field = "id"
//!
//! [[columns]]
//! name = "Price"
//! field = "/item/price"
//! type = "decimal"
//! ```
//!
//! The same structure is accepted as YAML. A column without `field` has no
//! extractor and fails validation when rendered.

use crate::definition::{ColumnSpec, ReportDefinition};
use crate::jsonl::{field_extractor, FieldKind};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read definition file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML definition: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid YAML definition: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unsupported definition file {}: expected .toml, .yaml or .yml", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Invalid timezone: {0}. Use IANA timezone names like 'UTC', 'Europe/Paris', 'America/New_York'")]
    InvalidTimezone(String),
}

/// A report definition as written in a file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time_format: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,

    /// IANA timezone id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    #[serde(default)]
    pub columns: Vec<ColumnConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnConfig {
    #[serde(default)]
    pub name: String,

    /// Key or JSON pointer of the source field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    #[serde(default, rename = "type")]
    pub kind: FieldKind,
}

/// Formatting settings that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct FormatOverrides {
    pub timezone: Option<String>,
    pub date_time_format: Option<String>,
    pub date_format: Option<String>,
}

impl ReportFile {
    /// Load a definition, choosing the format from the file extension.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let parse: fn(&str) -> Result<Self, ConfigError> = match extension.as_deref() {
            Some("toml") => Self::from_toml,
            Some("yaml") | Some("yml") => Self::from_yaml,
            _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        };
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        parse(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn apply_overrides(&mut self, overrides: &FormatOverrides) {
        if let Some(timezone) = &overrides.timezone {
            self.timezone = Some(timezone.clone());
        }
        if let Some(pattern) = &overrides.date_time_format {
            self.date_time_format = Some(pattern.clone());
        }
        if let Some(pattern) = &overrides.date_format {
            self.date_format = Some(pattern.clone());
        }
    }

    /// Build a definition over JSON rows.
    ///
    /// Only the timezone is checked here; column structure and patterns are
    /// checked when the definition is validated.
    pub fn to_definition(&self) -> Result<ReportDefinition<Value>, ConfigError> {
        let mut builder = ReportDefinition::builder();
        if let Some(pattern) = &self.date_time_format {
            builder = builder.date_time_format(pattern.clone());
        }
        if let Some(pattern) = &self.date_format {
            builder = builder.date_format(pattern.clone());
        }
        if let Some(timezone) = &self.timezone {
            builder = builder.timezone(parse_timezone(timezone)?);
        }

        for column in &self.columns {
            let column_type = column.kind.column_type();
            let spec = match &column.field {
                Some(field) => ColumnSpec::try_new(
                    column.name.clone(),
                    column_type,
                    field_extractor(field.clone(), column.kind),
                ),
                None => ColumnSpec::without_extractor(column.name.clone(), column_type),
            };
            builder = builder.add_column_spec(spec);
        }
        Ok(builder.build())
    }
}

/// Parse an IANA timezone id.
pub fn parse_timezone(id: &str) -> Result<Tz, ConfigError> {
    id.parse::<Tz>()
        .map_err(|_| ConfigError::InvalidTimezone(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use report_core::ColumnType;
    use serde_json::json;

    const TOML_DEFINITION: &str = r#"
timezone = "Europe/Paris"
date_time_format = "%d/%m/%Y %H:%M"

[[columns]]
name = "Item ID"
field = "id"

[[columns]]
name = "Price"
field = "/item/price"
type = "decimal"

[[columns]]
name = "Created"
field = "created"
type = "epoch_millis"
"#;

    #[test]
    fn test_from_toml() {
        let file = ReportFile::from_toml(TOML_DEFINITION).unwrap();
        assert_eq!(file.timezone.as_deref(), Some("Europe/Paris"));
        assert_eq!(file.columns.len(), 3);
        assert_eq!(file.columns[0].kind, FieldKind::Auto);
        assert_eq!(file.columns[1].field.as_deref(), Some("/item/price"));
        assert_eq!(file.columns[2].kind, FieldKind::EpochMillis);
    }

    #[test]
    fn test_from_yaml() {
        let yaml = r#"
date_format: "%d.%m.%Y"
columns:
  - name: Item ID
    field: id
  - name: Day
    field: day
    type: date
"#;
        let file = ReportFile::from_yaml(yaml).unwrap();
        assert_eq!(file.date_format.as_deref(), Some("%d.%m.%Y"));
        assert_eq!(file.columns[1].kind, FieldKind::Date);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = ReportFile::from_toml("colums = []").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = ReportFile::load("report.json").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_invalid_timezone() {
        let file = ReportFile {
            timezone: Some("Mars/Olympus".to_string()),
            ..Default::default()
        };
        let err = file.to_definition().unwrap_err();
        assert!(err.to_string().contains("Mars/Olympus"));
    }

    #[test]
    fn test_to_definition() {
        let file = ReportFile::from_toml(TOML_DEFINITION).unwrap();
        let definition = file.to_definition().unwrap();

        assert!(definition.validate().is_ok());
        assert_eq!(
            definition.columns_header(),
            vec!["Item ID", "Price", "Created"]
        );
        assert_eq!(
            definition.columns()[2].column_type(),
            Some(ColumnType::EpochMillis)
        );

        let row = json!({"id": 1, "item": {"price": "10.50"}, "created": 1709467200000i64});
        let formatted = definition.map_row(&row).unwrap();
        assert_eq!(formatted.get(0), Some("1"));
        assert_eq!(formatted.get(1), Some("10.5"));
        assert_eq!(formatted.get(2), Some("03/03/2024 13:00"));
    }

    #[test]
    fn test_column_without_field_fails_validation() {
        let file = ReportFile::from_toml("[[columns]]\nname = \"Item ID\"\n").unwrap();
        let definition = file.to_definition().unwrap();
        assert_eq!(
            definition.validate().unwrap_err().to_string(),
            "Report definition column[0] mapper could not be null"
        );
    }

    #[test]
    fn test_overrides_win() {
        let mut file = ReportFile::from_toml(TOML_DEFINITION).unwrap();
        file.apply_overrides(&FormatOverrides {
            timezone: Some("UTC".to_string()),
            date_time_format: None,
            date_format: Some("%Y".to_string()),
        });
        assert_eq!(file.timezone.as_deref(), Some("UTC"));
        assert_eq!(file.date_time_format.as_deref(), Some("%d/%m/%Y %H:%M"));
        assert_eq!(file.date_format.as_deref(), Some("%Y"));
    }
}

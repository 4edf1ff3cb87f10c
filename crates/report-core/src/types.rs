//! Semantic column types.
//!
//! A column's semantic type says how a raw value should be interpreted,
//! independent of the value's concrete runtime type. An integer is just an
//! integer unless its column says it counts seconds or milliseconds since
//! the Unix epoch.

use std::fmt;

/// Semantic tag attached to a report column.
///
/// Columns without a tag format their values purely by runtime type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// Integer values are seconds since 1970-01-01T00:00:00Z.
    EpochSeconds,

    /// Integer values are milliseconds since 1970-01-01T00:00:00Z.
    EpochMillis,
}

impl ColumnType {
    /// Short lowercase name, as used in definition files.
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::EpochSeconds => "epoch_seconds",
            ColumnType::EpochMillis => "epoch_millis",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_as_str() {
        assert_eq!(ColumnType::EpochSeconds.to_string(), "epoch_seconds");
        assert_eq!(ColumnType::EpochMillis.to_string(), "epoch_millis");
    }
}

// Helpers shared by the tabular readers.

use crate::dash::{DashResult, MissingColumnSnafu, PercentParseSnafu};
use snafu::OptionExt;

/// A table of raw string cells, as produced by any of the providers.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// The index of a named column; the file path is carried for context.
    pub fn column(&self, name: &str, path: &str) -> DashResult<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .context(MissingColumnSnafu { column: name, path })
    }
}

pub fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

/// Parses a percentage cell. Rejects anything that is not a finite number,
/// so that an inconsistent source table cannot reach the joined table.
pub fn parse_percent(value: &str, name: &str, column: &str) -> DashResult<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite())
        .context(PercentParseSnafu {
            name,
            column,
            value,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_cells_must_be_finite_numbers() {
        assert_eq!(parse_percent(" 17.8 ", "Canada", "Percent_age_0_to_9").unwrap(), 17.8);
        assert!(parse_percent("", "Canada", "Percent_age_0_to_9").is_err());
        assert!(parse_percent("NaN", "Canada", "Percent_age_0_to_9").is_err());
        assert!(parse_percent("inf", "Canada", "Percent_age_0_to_9").is_err());
        assert!(parse_percent("17,8", "Canada", "Percent_age_0_to_9").is_err());
    }

    #[test]
    fn missing_cells_read_as_empty() {
        let row = vec!["a".to_string()];
        assert_eq!(cell(&row, 0), "a");
        assert_eq!(cell(&row, 5), "");
    }
}

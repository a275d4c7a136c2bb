use serde::Deserialize;

/// Tokens read as missing values in delimited text, matching the pandas defaults.
pub const DEFAULT_NULL_VALUES: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "null", "NULL", "None", "<NA>", "#N/A",
];

/// Reader settings applied by [`crate::data::model::Dataset::load_with`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReadOptions {
    /// Field delimiter for `.csv` / `.txt`.
    pub delimiter: u8,
    /// Worksheet to read from a spreadsheet. `None` reads the first sheet.
    pub sheet: Option<String>,
    /// Missing-value tokens on top of [`DEFAULT_NULL_VALUES`].
    pub extra_null_values: Vec<String>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            sheet: None,
            extra_null_values: Vec::new(),
        }
    }
}

impl ReadOptions {
    pub fn is_null_token(&self, s: &str) -> bool {
        DEFAULT_NULL_VALUES.contains(&s) || self.extra_null_values.iter().any(|v| v == s)
    }
}

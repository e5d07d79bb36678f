//! Decoder for bracket-delimited list cells such as `[812.3, 815.1, 809.8]`.
//!
//! Scan files store one list per cell. Surrounding brackets are stripped from
//! both ends, items are split on `,` and trimmed. Decoding happens once at load
//! time so the aggregation code only ever sees typed grids.

use bifi_core::{BifiError, BifiResult};

fn strip_brackets(cell: &str) -> &str {
    cell.trim().trim_matches(|c| c == '[' || c == ']')
}

/// Decode a numeric list. Empty items and `nan` decode as missing (`NaN`).
pub fn parse_numeric_list(cell: &str) -> BifiResult<Vec<f64>> {
    let body = strip_brackets(cell);
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    body.split(',')
        .map(|item| {
            let item = item.trim();
            if item.is_empty() {
                return Ok(f64::NAN);
            }
            item.parse::<f64>()
                .map_err(|_| BifiError::Parse(format!("'{item}' is not a number in list {cell}")))
        })
        .collect()
}

/// Decode a list of material labels, dropping surrounding quotes.
pub fn parse_tag_list(cell: &str) -> Vec<String> {
    let body = strip_brackets(cell);
    if body.trim().is_empty() {
        return Vec::new();
    }
    body.split(',')
        .map(|item| item.trim().trim_matches(|c| c == '\'' || c == '"').to_string())
        .collect()
}

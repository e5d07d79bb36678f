//! Per-timestamp performance output of an array run.

use serde::{Deserialize, Deserializer, Serialize};

use crate::scan::MetaColumns;

// JSON has no NaN; non-finite values are written as null
fn nan_if_null<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

/// Derived quantities for one timestamp. Immutable once computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(rename = "ModNumber", default, skip_serializing_if = "Option::is_none")]
    pub mod_number: Option<i64>,
    #[serde(rename = "rowNum", default, skip_serializing_if = "Option::is_none")]
    pub row_num: Option<i64>,
    /// Effective plane-of-array irradiance, front plus weighted rear (W/m²)
    #[serde(rename = "POA_eff", deserialize_with = "nan_if_null")]
    pub poa_eff: f64,
    /// Mean unmasked rear irradiance (W/m²)
    #[serde(rename = "Grear_mean", deserialize_with = "nan_if_null")]
    pub grear_mean: f64,
    /// Mean unmasked front irradiance (W/m²)
    #[serde(rename = "Gfront_mean", deserialize_with = "nan_if_null")]
    pub gfront_mean: f64,
    /// Maximum power at `POA_eff` (W)
    #[serde(rename = "Pout", deserialize_with = "nan_if_null")]
    pub pout: f64,
    /// Maximum power from front irradiance alone (W)
    #[serde(rename = "Pout_Gfront", deserialize_with = "nan_if_null")]
    pub pout_gfront: f64,
    /// Bifacial irradiance gain (%)
    #[serde(rename = "BGG", deserialize_with = "nan_if_null")]
    pub bgg: f64,
    /// Bifacial energy gain (%)
    #[serde(rename = "BGE", deserialize_with = "nan_if_null")]
    pub bge: f64,
    /// Mismatch loss from non-uniform irradiance (%)
    #[serde(rename = "Mismatch", deserialize_with = "nan_if_null")]
    pub mismatch: f64,
    /// `Pout` reduced by the mismatch loss (W)
    #[serde(rename = "Pout_red", deserialize_with = "nan_if_null")]
    pub pout_red: f64,
}

impl PerformanceRow {
    /// Numeric columns in output order.
    pub fn values(&self) -> [f64; 9] {
        [
            self.poa_eff,
            self.grear_mean,
            self.gfront_mean,
            self.pout,
            self.pout_gfront,
            self.bgg,
            self.bge,
            self.mismatch,
            self.pout_red,
        ]
    }
}

/// Names of the numeric output columns, in order.
pub const VALUE_COLUMNS: [&str; 9] = [
    "POA_eff",
    "Grear_mean",
    "Gfront_mean",
    "Pout",
    "Pout_Gfront",
    "BGG",
    "BGE",
    "Mismatch",
    "Pout_red",
];

/// One row per input timestamp, in input order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PerformanceTable {
    pub columns: MetaColumns,
    pub rows: Vec<PerformanceRow>,
}

impl PerformanceTable {
    pub fn new(columns: MetaColumns, rows: Vec<PerformanceRow>) -> Self {
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PerformanceRow> {
        self.rows.iter()
    }

    /// Output header: present passthrough columns first, then [`VALUE_COLUMNS`].
    pub fn header(&self) -> Vec<&'static str> {
        let mut header = Vec::with_capacity(12);
        if self.columns.timestamp {
            header.push("timestamp");
        }
        if self.columns.mod_number {
            header.push("ModNumber");
        }
        if self.columns.row_num {
            header.push("rowNum");
        }
        header.extend(VALUE_COLUMNS);
        header
    }

    /// Extract one numeric column by its output name.
    pub fn series(&self, name: &str) -> Option<Vec<f64>> {
        let idx = VALUE_COLUMNS.iter().position(|c| *c == name)?;
        Some(self.rows.iter().map(|r| r.values()[idx]).collect())
    }
}

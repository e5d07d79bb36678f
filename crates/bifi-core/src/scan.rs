//! Decoded irradiance scans: per-sensor front/rear readings plus material tags.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{BifiError, BifiResult};
use crate::grid::{IrradianceGrid, MaterialGrid};

/// Optional passthrough columns carried from the source to the output table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowMeta {
    pub timestamp: Option<String>,
    pub mod_number: Option<i64>,
    pub row_num: Option<i64>,
}

/// Which passthrough columns the source actually had.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaColumns {
    pub timestamp: bool,
    pub mod_number: bool,
    pub row_num: bool,
}

/// One timestamp of in-memory scan results.
///
/// Field names follow the on-disk scan format so that a JSON dump of the
/// ray-trace results deserializes directly. `null` irradiance entries decode
/// as missing (`NaN`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    #[serde(rename = "Wm2Front", deserialize_with = "nullable_floats")]
    pub wm2_front: Vec<f64>,
    #[serde(rename = "Wm2Back", deserialize_with = "nullable_floats")]
    pub wm2_back: Vec<f64>,
    pub mattype: Vec<String>,
    #[serde(rename = "rearMat")]
    pub rear_mat: Vec<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub timestamp: Option<String>,
    #[serde(rename = "ModNumber", default)]
    pub mod_number: Option<i64>,
    #[serde(rename = "Row", default)]
    pub row: Option<i64>,
}

/// In-memory results keyed by row index; processed in ascending index order.
pub type ScanResults = BTreeMap<usize, ScanRecord>;

/// Everything one aggregation run needs, validated for alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayScan {
    pub front: IrradianceGrid,
    pub rear: IrradianceGrid,
    pub front_tags: MaterialGrid,
    pub rear_tags: MaterialGrid,
    pub meta: Vec<RowMeta>,
    pub columns: MetaColumns,
}

impl ArrayScan {
    /// Assemble a scan without passthrough columns.
    pub fn new(
        front: IrradianceGrid,
        rear: IrradianceGrid,
        front_tags: MaterialGrid,
        rear_tags: MaterialGrid,
    ) -> BifiResult<Self> {
        let meta = vec![RowMeta::default(); front.rows()];
        Self::with_meta(front, rear, front_tags, rear_tags, meta, MetaColumns::default())
    }

    pub fn with_meta(
        front: IrradianceGrid,
        rear: IrradianceGrid,
        front_tags: MaterialGrid,
        rear_tags: MaterialGrid,
        meta: Vec<RowMeta>,
        columns: MetaColumns,
    ) -> BifiResult<Self> {
        let scan = Self {
            front,
            rear,
            front_tags,
            rear_tags,
            meta,
            columns,
        };
        scan.validate()?;
        Ok(scan)
    }

    /// Front and rear share timestamps; each tag grid mirrors its irradiance grid.
    pub fn validate(&self) -> BifiResult<()> {
        if self.front.rows() != self.rear.rows() {
            return Err(BifiError::shape(
                "front vs rear timestamps",
                self.front.rows(),
                self.rear.rows(),
            ));
        }
        self.front
            .ensure_same_shape(&self.front_tags, "front irradiance vs front tags")?;
        self.rear
            .ensure_same_shape(&self.rear_tags, "rear irradiance vs rear tags")?;
        if self.meta.len() != self.front.rows() {
            return Err(BifiError::shape(
                "passthrough columns vs timestamps",
                self.front.rows(),
                self.meta.len(),
            ));
        }
        Ok(())
    }

    pub fn timestamps(&self) -> usize {
        self.front.rows()
    }

    /// Convert in-memory results into aligned grids.
    pub fn from_results(results: &ScanResults) -> BifiResult<Self> {
        let mut front = Vec::with_capacity(results.len());
        let mut rear = Vec::with_capacity(results.len());
        let mut front_tags = Vec::with_capacity(results.len());
        let mut rear_tags = Vec::with_capacity(results.len());
        let mut meta = Vec::with_capacity(results.len());
        let mut columns = MetaColumns::default();

        for (&index, record) in results {
            check_tagged(index, "front", &record.wm2_front, &record.mattype)?;
            check_tagged(index, "rear", &record.wm2_back, &record.rear_mat)?;
            front.push(record.wm2_front.clone());
            rear.push(record.wm2_back.clone());
            front_tags.push(record.mattype.clone());
            rear_tags.push(record.rear_mat.clone());
            columns.timestamp |= record.timestamp.is_some();
            columns.mod_number |= record.mod_number.is_some();
            columns.row_num |= record.row.is_some();
            meta.push(RowMeta {
                timestamp: record.timestamp.clone(),
                mod_number: record.mod_number,
                row_num: record.row,
            });
        }

        Self::with_meta(
            IrradianceGrid::from_rows(front, f64::NAN),
            IrradianceGrid::from_rows(rear, f64::NAN),
            MaterialGrid::from_rows(front_tags, String::new()),
            MaterialGrid::from_rows(rear_tags, String::new()),
            meta,
            columns,
        )
    }
}

/// One row's readings and tags must pair up before rows are padded to a common width.
pub fn check_tagged(row: usize, side: &str, irradiance: &[f64], tags: &[String]) -> BifiResult<()> {
    if irradiance.len() != tags.len() {
        return Err(BifiError::shape(
            format!("row {row}: {side} irradiance vs {side} tags"),
            irradiance.len(),
            tags.len(),
        ));
    }
    Ok(())
}

fn nullable_floats<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<Option<f64>> = Vec::deserialize(deserializer)?;
    Ok(raw.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(front: Vec<f64>, back: Vec<f64>) -> ScanRecord {
        ScanRecord {
            mattype: vec!["a10.3.a0.PVmodule.6457".into(); front.len()],
            rear_mat: vec!["a10.3.a0.PVmodule.2310".into(); back.len()],
            wm2_front: front,
            wm2_back: back,
            timestamp: None,
            mod_number: None,
            row: None,
        }
    }

    #[test]
    fn from_results_orders_by_index_and_pads() {
        let mut results = ScanResults::new();
        results.insert(7, record(vec![600.0, 610.0], vec![80.0]));
        results.insert(2, record(vec![800.0, 820.0], vec![100.0, 110.0]));

        let scan = ArrayScan::from_results(&results).unwrap();
        assert_eq!(scan.timestamps(), 2);
        assert_eq!(scan.front.row(0), &[800.0, 820.0]);
        assert_eq!(scan.rear.row(1)[0], 80.0);
        assert!(scan.rear.row(1)[1].is_nan());
        assert_eq!(scan.rear_tags.row(1)[1], "");
        assert_eq!(scan.columns, MetaColumns::default());
    }

    #[test]
    fn from_results_tracks_passthrough_columns() {
        let mut results = ScanResults::new();
        let mut rec = record(vec![800.0], vec![100.0]);
        rec.timestamp = Some("2021-06-01 12:00".into());
        rec.row = Some(2);
        results.insert(0, rec);

        let scan = ArrayScan::from_results(&results).unwrap();
        assert!(scan.columns.timestamp);
        assert!(!scan.columns.mod_number);
        assert!(scan.columns.row_num);
        assert_eq!(scan.meta[0].row_num, Some(2));
    }

    #[test]
    fn mismatched_tag_width_is_rejected() {
        let front = IrradianceGrid::filled(1, 2, 800.0);
        let rear = IrradianceGrid::filled(1, 2, 100.0);
        let front_tags = MaterialGrid::filled(1, 3, "glass".to_string());
        let rear_tags = MaterialGrid::filled(1, 2, "glass".to_string());
        let err = ArrayScan::new(front, rear, front_tags, rear_tags).unwrap_err();
        assert!(matches!(err, BifiError::ShapeMismatch { .. }));
    }

    #[test]
    fn short_tag_list_in_one_record_is_rejected() {
        let mut results = ScanResults::new();
        results.insert(0, record(vec![800.0, 820.0, 815.0], vec![100.0, 110.0, 104.0]));
        let mut short = record(vec![600.0, 610.0], vec![80.0, 90.0, 5.0]);
        short.rear_mat.truncate(2);
        results.insert(1, short);

        let err = ArrayScan::from_results(&results).unwrap_err();
        assert!(matches!(err, BifiError::ShapeMismatch { expected: 3, found: 2, .. }));
        assert!(err.to_string().contains("row 1: rear irradiance vs rear tags"));
    }

    #[test]
    fn misaligned_timestamps_are_rejected() {
        let front = IrradianceGrid::filled(2, 2, 800.0);
        let rear = IrradianceGrid::filled(3, 2, 100.0);
        let err = ArrayScan::new(
            front,
            rear,
            MaterialGrid::filled(2, 2, String::new()),
            MaterialGrid::filled(3, 2, String::new()),
        )
        .unwrap_err();
        assert!(err.to_string().contains("front vs rear timestamps"));
    }

    #[test]
    fn record_deserializes_nulls_and_numeric_timestamps() {
        let rec: ScanRecord = serde_json::from_value(json!({
            "Wm2Front": [800.0, null],
            "Wm2Back": [100.0],
            "mattype": ["glass", "sky"],
            "rearMat": ["glass"],
            "timestamp": 1622548800,
            "ModNumber": 10
        }))
        .unwrap();
        assert!(rec.wm2_front[1].is_nan());
        assert_eq!(rec.timestamp.as_deref(), Some("1622548800"));
        assert_eq!(rec.mod_number, Some(10));
        assert_eq!(rec.row, None);
    }
}

//! Exclusion of sensor readings that landed on racking or sky instead of module surface.

use bifi_core::{BifiResult, Grid, IrradianceGrid, MaterialGrid};

/// Substrings marking a material tag as structure rather than module surface.
pub const OBSTRUCTION_MARKERS: [&str; 7] = ["sky", "pole", "tube", "bar", "ground", "3267", "1540"];

/// Case-sensitive substring matcher over material tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObstructionMatcher {
    markers: Vec<String>,
}

impl Default for ObstructionMatcher {
    fn default() -> Self {
        Self::new(OBSTRUCTION_MARKERS)
    }
}

impl ObstructionMatcher {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markers: markers.into_iter().map(Into::into).collect(),
        }
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    pub fn matches(&self, tag: &str) -> bool {
        self.markers.iter().any(|m| tag.contains(m.as_str()))
    }

    /// `true` wherever the tag marks an obstruction.
    pub fn mask(&self, tags: &MaterialGrid) -> Grid<bool> {
        tags.map(|tag| self.matches(tag))
    }

    /// Set obstructed readings to missing. Returns the number of cells masked.
    pub fn apply(&self, irradiance: &mut IrradianceGrid, tags: &MaterialGrid) -> BifiResult<usize> {
        irradiance.ensure_same_shape(tags, "irradiance vs material tags")?;
        let mask = self.mask(tags);
        let mut masked = 0;
        for r in 0..irradiance.rows() {
            for (value, &hit) in irradiance.row_mut(r).iter_mut().zip(mask.row(r)) {
                if hit {
                    *value = f64::NAN;
                    masked += 1;
                }
            }
        }
        Ok(masked)
    }
}

//! Ambient inputs that may be a single value or one value per timestamp.

use bifi_core::{BifiError, BifiResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Profile {
    Constant(f64),
    Series(Vec<f64>),
}

impl Profile {
    /// Value at timestamp `i`. Callers check the length first with [`Profile::check_len`].
    pub(crate) fn value_at(&self, i: usize) -> f64 {
        match self {
            Profile::Constant(v) => *v,
            Profile::Series(values) => values[i],
        }
    }

    pub fn check_len(&self, len: usize, context: &str) -> BifiResult<()> {
        match self {
            Profile::Series(values) if values.len() != len => {
                Err(BifiError::shape(context, len, values.len()))
            }
            _ => Ok(()),
        }
    }

    /// Expand to exactly `len` values.
    pub fn resolve(&self, len: usize, context: &str) -> BifiResult<Vec<f64>> {
        self.check_len(len, context)?;
        Ok((0..len).map(|i| self.value_at(i)).collect())
    }
}

impl From<f64> for Profile {
    fn from(value: f64) -> Self {
        Profile::Constant(value)
    }
}

impl From<Vec<f64>> for Profile {
    fn from(values: Vec<f64>) -> Self {
        Profile::Series(values)
    }
}

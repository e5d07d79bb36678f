//! CEC single-diode module coefficients at reference conditions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{BifiError, BifiResult};

/// Field names as they appear in CEC module libraries.
pub const CEC_FIELDS: [&str; 7] = [
    "alpha_sc", "a_ref", "I_L_ref", "I_o_ref", "R_sh_ref", "R_s", "Adjust",
];

/// Reference-condition coefficients for one module model.
///
/// Read-only for the whole run; the array pipeline holds one record for the
/// bifacial model and one for the front-only reference (often the same).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CecModuleParams {
    /// Short-circuit current temperature coefficient (A/°C)
    pub alpha_sc: f64,
    /// Modified ideality factor at reference conditions (V)
    pub a_ref: f64,
    /// Light-generated current at reference conditions (A)
    #[serde(rename = "I_L_ref")]
    pub i_l_ref: f64,
    /// Diode saturation current at reference conditions (A)
    #[serde(rename = "I_o_ref")]
    pub i_o_ref: f64,
    /// Shunt resistance at reference conditions (Ω)
    #[serde(rename = "R_sh_ref")]
    pub r_sh_ref: f64,
    /// Series resistance (Ω)
    #[serde(rename = "R_s")]
    pub r_s: f64,
    /// Temperature coefficient adjustment (%)
    #[serde(rename = "Adjust")]
    pub adjust: f64,
}

impl CecModuleParams {
    /// Build from a loosely typed record, accepting numbers or numeric strings.
    pub fn from_fields(fields: &BTreeMap<String, Value>) -> BifiResult<Self> {
        Self::from_lookup(|name| fields.get(name).cloned())
    }

    /// Build by asking `field` for each of the seven [`CEC_FIELDS`].
    pub fn from_lookup(mut field: impl FnMut(&str) -> Option<Value>) -> BifiResult<Self> {
        let mut values = [0.0; 7];
        for (slot, name) in values.iter_mut().zip(CEC_FIELDS) {
            let raw = field(name).ok_or_else(|| {
                BifiError::InvalidModuleParams(format!("missing required field '{name}'"))
            })?;
            *slot = coerce_number(name, &raw)?;
        }
        let [alpha_sc, a_ref, i_l_ref, i_o_ref, r_sh_ref, r_s, adjust] = values;
        let params = Self {
            alpha_sc,
            a_ref,
            i_l_ref,
            i_o_ref,
            r_sh_ref,
            r_s,
            adjust,
        };
        params.validate()?;
        Ok(params)
    }

    /// Every coefficient must be finite.
    pub fn validate(&self) -> BifiResult<()> {
        let named = [
            ("alpha_sc", self.alpha_sc),
            ("a_ref", self.a_ref),
            ("I_L_ref", self.i_l_ref),
            ("I_o_ref", self.i_o_ref),
            ("R_sh_ref", self.r_sh_ref),
            ("R_s", self.r_s),
            ("Adjust", self.adjust),
        ];
        for (name, value) in named {
            if !value.is_finite() {
                return Err(BifiError::InvalidModuleParams(format!(
                    "field '{name}' is not finite ({value})"
                )));
            }
        }
        Ok(())
    }
}

fn coerce_number(name: &str, value: &Value) -> BifiResult<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| {
        BifiError::InvalidModuleParams(format!("field '{name}' is not numeric: {value}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cs5p_fields() -> BTreeMap<String, Value> {
        let mut fields = BTreeMap::new();
        fields.insert("alpha_sc".into(), json!(0.004539));
        fields.insert("a_ref".into(), json!(2.6373));
        fields.insert("I_L_ref".into(), json!("5.114"));
        fields.insert("I_o_ref".into(), json!(8.196e-10));
        fields.insert("R_sh_ref".into(), json!(381.68));
        fields.insert("R_s".into(), json!(1.065));
        fields.insert("Adjust".into(), json!(8.7));
        fields
    }

    #[test]
    fn from_fields_accepts_numeric_strings() {
        let params = CecModuleParams::from_fields(&cs5p_fields()).unwrap();
        assert!((params.i_l_ref - 5.114).abs() < 1e-12);
        assert!((params.adjust - 8.7).abs() < 1e-12);
    }

    #[test]
    fn missing_field_is_invalid() {
        let mut fields = cs5p_fields();
        fields.remove("R_s");
        let err = CecModuleParams::from_fields(&fields).unwrap_err();
        assert!(matches!(err, BifiError::InvalidModuleParams(_)));
        assert!(err.to_string().contains("R_s"));
    }

    #[test]
    fn non_numeric_field_is_invalid() {
        let mut fields = cs5p_fields();
        fields.insert("a_ref".into(), json!("n/a"));
        let err = CecModuleParams::from_fields(&fields).unwrap_err();
        assert!(err.to_string().contains("a_ref"));

        fields.insert("a_ref".into(), json!(null));
        assert!(CecModuleParams::from_fields(&fields).is_err());
    }

    #[test]
    fn serde_uses_library_field_names() {
        let params = CecModuleParams::from_fields(&cs5p_fields()).unwrap();
        let value = serde_json::to_value(params).unwrap();
        assert!(value.get("I_o_ref").is_some());
        assert!(value.get("R_sh_ref").is_some());
        let back: CecModuleParams = serde_json::from_value(value).unwrap();
        assert_eq!(back, params);
    }
}

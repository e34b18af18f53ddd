//! Tagged wire representation shared with the browser front end.
//!
//! Every value carries an `"mtype"` discriminator:
//! `{"mtype":"Complex","re":..,"im":..}`, `{"mtype":"Infinity"}` and
//! `{"mtype":"Moebious","m":[a,b,c,d]}`.

use crate::error::{ModularError, Result};
use crate::moebius::MoebiusTransformation;
use crate::plane::ExtendedComplex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mtype")]
pub enum MathValue {
    Complex {
        re: f64,
        im: f64,
    },
    Infinity,
    #[serde(rename = "Moebious", alias = "Moebius")]
    Moebius {
        m: [f64; 4],
    },
}

/// A decoded wire value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Point(ExtendedComplex),
    Transformation(MoebiusTransformation),
}

impl From<ExtendedComplex> for MathValue {
    fn from(value: ExtendedComplex) -> Self {
        match value {
            ExtendedComplex::Finite(z) => MathValue::Complex { re: z.re, im: z.im },
            ExtendedComplex::Infinity => MathValue::Infinity,
        }
    }
}

impl From<MoebiusTransformation> for MathValue {
    fn from(value: MoebiusTransformation) -> Self {
        MathValue::Moebius { m: value.entries() }
    }
}

impl TryFrom<MathValue> for ExtendedComplex {
    type Error = ModularError;
    fn try_from(value: MathValue) -> Result<Self> {
        match value {
            MathValue::Complex { re, im } => ExtendedComplex::try_finite(re, im),
            MathValue::Infinity => Ok(ExtendedComplex::Infinity),
            MathValue::Moebius { .. } => Err(ModularError::InvalidArgument(
                "expected a point, found a transformation".into(),
            )),
        }
    }
}

impl TryFrom<MathValue> for MoebiusTransformation {
    type Error = ModularError;
    fn try_from(value: MathValue) -> Result<Self> {
        match value {
            MathValue::Moebius { m } => MoebiusTransformation::try_from(m),
            _ => Err(ModularError::InvalidArgument(
                "expected a transformation, found a point".into(),
            )),
        }
    }
}

impl TryFrom<MathValue> for Value {
    type Error = ModularError;
    fn try_from(value: MathValue) -> Result<Self> {
        match value {
            MathValue::Moebius { .. } => Ok(Value::Transformation(value.try_into()?)),
            _ => Ok(Value::Point(value.try_into()?)),
        }
    }
}

/// Decodes a batch of wire values, stopping at the first invalid one.
pub fn parse_values(values: impl IntoIterator<Item = MathValue>) -> Result<Vec<Value>> {
    values.into_iter().map(Value::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn points_use_mtype_tags() {
        let z = ExtendedComplex::finite(0.5, 2.0);
        let encoded = serde_json::to_value(z).unwrap();
        assert_eq!(encoded, json!({"mtype": "Complex", "re": 0.5, "im": 2.0}));
        let decoded: ExtendedComplex = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, z);

        let encoded = serde_json::to_value(ExtendedComplex::Infinity).unwrap();
        assert_eq!(encoded, json!({"mtype": "Infinity"}));
    }

    #[test]
    fn transformations_validate_on_decode() {
        let t = MoebiusTransformation::new(1.0, 2.0, 0.0, 1.0).unwrap();
        let encoded = serde_json::to_value(t).unwrap();
        assert_eq!(encoded, json!({"mtype": "Moebious", "m": [1.0, 2.0, 0.0, 1.0]}));

        let bad = json!({"mtype": "Moebius", "m": [2.0, 0.0, 0.0, 1.0]});
        let err = serde_json::from_value::<MoebiusTransformation>(bad).unwrap_err();
        assert!(err.to_string().contains("determinant"));
    }

    #[test]
    fn parse_values_decodes_mixed_batches() {
        let raw: Vec<MathValue> = serde_json::from_value(json!([
            {"mtype": "Infinity"},
            {"mtype": "Complex", "re": 1.0, "im": 0.0},
            {"mtype": "Moebious", "m": [0.0, -1.0, 1.0, 0.0]}
        ]))
        .unwrap();
        let values = parse_values(raw).expect("valid batch");
        assert_eq!(values.len(), 3);
        assert_eq!(values[0], Value::Point(ExtendedComplex::Infinity));
        assert!(matches!(values[2], Value::Transformation(t) if t.c() == 1.0));
    }

    #[test]
    fn parse_values_rejects_unknown_or_invalid_entries() {
        let unknown = serde_json::from_value::<MathValue>(json!({"mtype": "Quaternion"}));
        assert!(unknown.is_err());

        let raw = vec![MathValue::Complex {
            re: f64::NAN,
            im: 0.0,
        }];
        assert!(parse_values(raw).is_err());
    }
}

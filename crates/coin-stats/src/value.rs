//! Field values carried by records and catalog features.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single field value: categorical text or a number.
///
/// Deserialises from a bare JSON string or number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Numeric attribute (quantity, weight, fineness, ...).
    Number(f64),
    /// Categorical attribute, possibly `/`-separated multi-value text.
    Text(String),
}

impl FieldValue {
    /// Returns true for numbers and non-empty text.
    pub fn is_present(&self) -> bool {
        match self {
            FieldValue::Number(n) => n.is_finite(),
            FieldValue::Text(s) => !s.is_empty(),
        }
    }

    /// Returns the text, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Number(_) => None,
        }
    }

    /// Returns the numeric value.
    ///
    /// Text is parsed leniently (surrounding whitespace ignored); text that is not a
    /// finite number yields `None`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) if n.is_finite() => Some(*n),
            FieldValue::Number(_) => None,
            FieldValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }

    /// Renders the value as an axis or category label.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

/// One token of a multi-valued categorical field.
///
/// `"Holland?"` yields `Token { value: "Holland", uncertain: true }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    /// The plain value, marker and whitespace stripped.
    pub value: String,
    /// Whether the source marked the value with a trailing `?`.
    pub uncertain: bool,
}

impl Token {
    /// Creates a token.
    pub fn new(value: impl Into<String>, uncertain: bool) -> Self {
        Self {
            value: value.into(),
            uncertain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presence() {
        assert!(FieldValue::from("Utrecht").is_present());
        assert!(!FieldValue::from("").is_present());
        assert!(FieldValue::from(0.0).is_present());
        assert!(!FieldValue::Number(f64::NAN).is_present());
    }

    #[test]
    fn test_as_number() {
        assert_eq!(FieldValue::from(0.9).as_number(), Some(0.9));
        assert_eq!(FieldValue::from(" 12.5 ").as_number(), Some(12.5));
        assert_eq!(FieldValue::from("twelve").as_number(), None);
        assert_eq!(FieldValue::from("inf").as_number(), None);
    }

    #[test]
    fn test_label_drops_integral_fraction() {
        assert_eq!(FieldValue::from(10.0).label(), "10");
        assert_eq!(FieldValue::from(0.25).label(), "0.25");
        assert_eq!(FieldValue::from("Dordrecht").label(), "Dordrecht");
    }

    #[test]
    fn test_untagged_deserialize() {
        let values: Vec<FieldValue> = serde_json::from_str(r#"[3, "gold", 0.5]"#).unwrap();
        assert_eq!(
            values,
            vec![
                FieldValue::Number(3.0),
                FieldValue::Text("gold".to_string()),
                FieldValue::Number(0.5)
            ]
        );
    }
}

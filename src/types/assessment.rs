//! Incident assessment produced by the synthesizer
//!
//! The assessment is the only value that leaves the pipeline on success.
//! It is either fully populated and valid, or it does not exist.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

use crate::errors::SynthesisError;

/// Closed severity scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    /// All accepted values, in schema order
    pub const ALL: [Severity; 3] = [Severity::High, Severity::Medium, Severity::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = SynthesisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Severity::ALL
            .iter()
            .copied()
            .find(|severity| severity.as_str() == s)
            .ok_or_else(|| {
                SynthesisError::SchemaViolation(format!(
                    "severity must be one of high, medium, low (got '{}')",
                    s
                ))
            })
    }
}

/// Root-cause assessment for one incident description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Assessment {
    /// Most likely root cause
    pub cause: String,
    /// Affected service
    pub service: String,
    /// Incident severity
    pub severity: Severity,
    /// Concrete remediation steps
    pub possible_fixes: String,
}

impl Assessment {
    /// Validate a raw model object against the assessment schema
    ///
    /// Fails on missing or extra fields, wrong types, a severity outside
    /// the closed set, or blank text fields. Nothing is coerced.
    pub fn from_value(value: Value) -> Result<Self, SynthesisError> {
        if !value.is_object() {
            return Err(SynthesisError::SchemaViolation(format!(
                "expected a JSON object, got {}",
                json_kind(&value)
            )));
        }

        let assessment: Assessment = serde_json::from_value(value)
            .map_err(|e| SynthesisError::SchemaViolation(e.to_string()))?;
        assessment.validate()?;

        Ok(assessment)
    }

    /// Check that every text field carries content
    pub fn validate(&self) -> Result<(), SynthesisError> {
        for (field, text) in [
            ("cause", &self.cause),
            ("service", &self.service),
            ("possible_fixes", &self.possible_fixes),
        ] {
            if text.trim().is_empty() {
                return Err(SynthesisError::SchemaViolation(format!(
                    "field '{}' must not be empty",
                    field
                )));
            }
        }
        Ok(())
    }

    /// JSON schema handed to the model for constrained decoding
    ///
    /// Sticks to the keyword subset strict structured-output modes accept;
    /// non-blank text is enforced by [`Assessment::validate`] instead.
    pub fn json_schema() -> Value {
        let severities: Vec<&str> = Severity::ALL.iter().map(Severity::as_str).collect();

        json!({
            "type": "object",
            "properties": {
                "cause": { "type": "string" },
                "service": { "type": "string" },
                "severity": { "type": "string", "enum": severities },
                "possible_fixes": { "type": "string" }
            },
            "required": ["cause", "service", "severity", "possible_fixes"],
            "additionalProperties": false
        })
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_object() -> Value {
        json!({
            "cause": "Connection pool exhausted on orders-db",
            "service": "orders-svc",
            "severity": "high",
            "possible_fixes": "Raise pool size; add backpressure on checkout"
        })
    }

    #[test]
    fn test_valid_assessment() {
        let assessment = Assessment::from_value(valid_object()).unwrap();
        assert_eq!(assessment.severity, Severity::High);
        assert_eq!(assessment.service, "orders-svc");
    }

    #[test]
    fn test_severity_outside_enum_rejected() {
        let mut value = valid_object();
        value["severity"] = json!("critical");

        let err = Assessment::from_value(value).unwrap_err();
        assert!(matches!(err, SynthesisError::SchemaViolation(_)));
    }

    #[test]
    fn test_severity_is_case_sensitive() {
        let mut value = valid_object();
        value["severity"] = json!("High");
        assert!(Assessment::from_value(value).is_err());
    }

    #[test]
    fn test_missing_field_rejected() {
        let mut value = valid_object();
        value.as_object_mut().unwrap().remove("possible_fixes");
        assert!(Assessment::from_value(value).is_err());
    }

    #[test]
    fn test_wrong_type_rejected() {
        let mut value = valid_object();
        value["cause"] = json!(42);
        assert!(Assessment::from_value(value).is_err());
    }

    #[test]
    fn test_extra_field_rejected() {
        let mut value = valid_object();
        value["confidence"] = json!(0.8);
        assert!(Assessment::from_value(value).is_err());
    }

    #[test]
    fn test_blank_field_rejected() {
        let mut value = valid_object();
        value["service"] = json!("   ");

        let err = Assessment::from_value(value).unwrap_err();
        assert!(err.to_string().contains("service"));
    }

    #[test]
    fn test_non_object_rejected() {
        let err = Assessment::from_value(json!(["high"])).unwrap_err();
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn test_serializes_exactly_four_fields() {
        let assessment = Assessment::from_value(valid_object()).unwrap();
        let value = serde_json::to_value(&assessment).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object.len(), 4);
        assert_eq!(object["severity"], json!("high"));
    }

    #[test]
    fn test_severity_from_str() {
        assert_eq!("medium".parse::<Severity>().unwrap(), Severity::Medium);
        assert!("critical".parse::<Severity>().is_err());
    }

    #[test]
    fn test_schema_is_strict_mode_compatible() {
        let schema = Assessment::json_schema();
        assert_eq!(
            schema,
            json!({
                "type": "object",
                "properties": {
                    "cause": { "type": "string" },
                    "service": { "type": "string" },
                    "severity": { "type": "string", "enum": ["high", "medium", "low"] },
                    "possible_fixes": { "type": "string" }
                },
                "required": ["cause", "service", "severity", "possible_fixes"],
                "additionalProperties": false
            })
        );
        assert!(!schema.to_string().contains("minLength"));
    }

    #[test]
    fn test_schema_lists_severities() {
        let schema = Assessment::json_schema();
        assert_eq!(schema["properties"]["severity"]["enum"], json!(["high", "medium", "low"]));
        assert_eq!(schema["required"].as_array().unwrap().len(), 4);
    }
}

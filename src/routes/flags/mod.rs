pub mod routes;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;
use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::model::{FeatureFlag, Variant};

// MODELS

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFlagRequest {
    pub flag_key: String,
    pub description: Option<String>,
    pub enabled: bool,
    /// Serialized JSON array of variant objects, parsed at read time.
    pub variants_json: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEnabledRequest {
    pub enabled: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagResponse {
    pub id: Option<Uuid>,
    pub flag_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub enabled: bool,
    pub variants: Vec<Variant>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<FeatureFlag> for FlagResponse {
    fn from(flag: FeatureFlag) -> Self {
        FlagResponse {
            id: flag.id,
            flag_key: flag.flag_key,
            description: flag.description,
            enabled: flag.enabled,
            variants: flag.variants,
            created_at: flag.created_at,
            updated_at: flag.updated_at,
        }
    }
}

// HELPER FUNCTIONS

// Validating the flag key
pub fn validate_flag_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::InvalidInput("Flag key cannot be empty".to_string()));
    }

    if key.len() > 64 {
        return Err(Error::InvalidInput(
            "Flag key is too long (Max: 64 characters)".to_string(),
        ));
    }

    if !key.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
        return Err(Error::InvalidInput(
            "Flag key must start with a letter".to_string(),
        ));
    }

    if !key
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
    {
        return Err(Error::InvalidInput(
            "Flag key can only contain lowercase letters, numbers, underscores and hyphens"
                .to_string(),
        ));
    }

    Ok(())
}

/// Parse and validate the `variantsJson` payload field.
pub fn parse_variants(variants_json: &str) -> Result<Vec<Variant>> {
    let variants: Vec<Variant> = serde_json::from_str(variants_json)
        .map_err(|e| Error::InvalidInput(format!("Malformed variantsJson: {}", e)))?;
    validate_variants(&variants)?;
    Ok(variants)
}

pub fn validate_variants(variants: &[Variant]) -> Result<()> {
    let mut seen = HashSet::new();
    for variant in variants {
        if variant.name.is_empty() {
            return Err(Error::InvalidInput(
                "Variant name cannot be empty".to_string(),
            ));
        }
        if !seen.insert(variant.name.as_str()) {
            return Err(Error::InvalidInput(format!(
                "Duplicate variant name: {}",
                variant.name
            )));
        }
        if let Some(weight) = variant.weight {
            if weight > 100 {
                return Err(Error::InvalidInput(format!(
                    "Variant weight must be between 0 and 100, got {}",
                    weight
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_flag_key() {
        assert!(validate_flag_key("homepage_banner").is_ok());
        assert!(validate_flag_key("dark-mode-2").is_ok());

        assert!(validate_flag_key("").is_err());
        assert!(validate_flag_key("9starts_with_digit").is_err());
        assert!(validate_flag_key("Uppercase").is_err());
        assert!(validate_flag_key("has space").is_err());
        assert!(validate_flag_key(&"k".repeat(65)).is_err());
    }

    #[test]
    fn test_parse_variants_accepts_rules_and_weights() {
        let variants =
            parse_variants(r#"[{"name":"A","rule":{"country":"IE"}},{"name":"B","weight":100}]"#)
                .unwrap();
        assert_eq!(variants.len(), 2);
    }

    #[test]
    fn test_parse_variants_rejects_malformed_json() {
        let err = parse_variants("not json").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_parse_variants_rejects_duplicate_names() {
        let err = parse_variants(r#"[{"name":"A","weight":50},{"name":"A","weight":50}]"#)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_parse_variants_rejects_oversized_weight() {
        let err = parse_variants(r#"[{"name":"A","weight":150}]"#).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}

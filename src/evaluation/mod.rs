use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::model::{FeatureFlag, TargetingRule, Variant};
use crate::store::FlagStore;

/// Bucket identity used when the context carries no user id.
const ANONYMOUS_USER: &str = "anonymous";

// Targeting context for evaluation
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetingContext {
    pub user_id: Option<String>,
    pub country: Option<String>,
    #[serde(flatten)]
    pub attributes: HashMap<String, String>,
}

impl TargetingContext {
    /// Look up a context field by its wire name.
    pub fn get(&self, field: &str) -> Option<&str> {
        match field {
            "userId" => self.user_id.as_deref(),
            "country" => self.country.as_deref(),
            _ => self.attributes.get(field).map(String::as_str),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationReason {
    FlagDisabled,
    NoVariants,
    VariantSelected,
}

// Flag evaluation result
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub flag_key: String,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    pub reason: EvaluationReason,
}

/// Evaluate a flag against a targeting context.
///
/// Pure and read-only: the same flag definition and context always produce
/// the same result.
pub fn evaluate_flag(flag: &FeatureFlag, context: &TargetingContext) -> EvaluationResult {
    // A disabled flag short-circuits variant selection entirely.
    if !flag.enabled {
        return EvaluationResult {
            flag_key: flag.flag_key.clone(),
            enabled: false,
            variant: None,
            reason: EvaluationReason::FlagDisabled,
        };
    }

    match select_variant(&flag.flag_key, &flag.variants, context) {
        Some(name) => EvaluationResult {
            flag_key: flag.flag_key.clone(),
            enabled: true,
            variant: Some(name.to_string()),
            reason: EvaluationReason::VariantSelected,
        },
        None => EvaluationResult {
            flag_key: flag.flag_key.clone(),
            enabled: true,
            variant: None,
            reason: EvaluationReason::NoVariants,
        },
    }
}

/// Select one variant from the list, or `None` when the list is empty.
///
/// Two layers, in order:
/// 1. the first variant in declaration order whose rule matches the context;
/// 2. weighted fallback over a stable hash bucket, walking the variants in
///    declaration order. The final variant absorbs any weight remainder.
pub fn select_variant<'a>(
    flag_key: &str,
    variants: &'a [Variant],
    context: &TargetingContext,
) -> Option<&'a str> {
    for variant in variants {
        if let Some(rule) = &variant.rule {
            if rule_matches(rule, context) {
                return Some(&variant.name);
            }
        }
    }

    let user_identifier = context.user_id.as_deref().unwrap_or(ANONYMOUS_USER);
    let bucket = bucket_for(flag_key, user_identifier);

    let mut cumulative = 0;
    for variant in variants.iter().take(variants.len().saturating_sub(1)) {
        cumulative += variant.weight.unwrap_or(0);
        if bucket < cumulative {
            return Some(&variant.name);
        }
    }

    // last variant's cumulative weight is clamped to 100
    variants.last().map(|v| v.name.as_str())
}

/// A rule matches when every field it names equals the context's value,
/// ignoring ASCII case. An empty rule never matches.
fn rule_matches(rule: &TargetingRule, context: &TargetingContext) -> bool {
    !rule.is_empty()
        && rule.iter().all(|(field, expected)| {
            context
                .get(field)
                .is_some_and(|actual| actual.eq_ignore_ascii_case(expected))
        })
}

/// Consistent hashing for sticky bucketing.
/// The same (flag, user) pair always lands in the same bucket.
fn bucket_for(flag_key: &str, user_identifier: &str) -> u32 {
    let mut hasher = DefaultHasher::new();
    format!("{}:{}", flag_key, user_identifier).hash(&mut hasher);
    (hasher.finish() % 100) as u32
}

/// Orchestrates store lookup and variant selection. Stateless beyond the
/// store handle; safe for concurrent use from any number of request tasks.
#[derive(Clone)]
pub struct FlagEvaluator {
    store: Arc<dyn FlagStore>,
}

impl FlagEvaluator {
    pub fn new(store: Arc<dyn FlagStore>) -> Self {
        FlagEvaluator { store }
    }

    /// Resolve a flag for the given context.
    ///
    /// Fails with `InvalidInput` on an empty key and `NotFound` when no flag
    /// exists for the key. Never mutates the flag or the context.
    pub async fn evaluate(
        &self,
        flag_key: &str,
        context: &TargetingContext,
    ) -> Result<EvaluationResult> {
        if flag_key.is_empty() {
            return Err(Error::InvalidInput("flag key cannot be empty".to_string()));
        }

        let flag = self
            .store
            .get(flag_key)
            .await?
            .ok_or_else(|| Error::NotFound(flag_key.to_string()))?;

        Ok(evaluate_flag(&flag, context))
    }
}

//! Shared post-processing of raw provider output.
//!
//! Every provider returns raw text; this module turns that text into a
//! validated [`Classification`]. Fence stripping and out-of-enum
//! substitution happen here so the strategies stay identical in behavior.

use serde::Deserialize;
use tracing::warn;

use crate::types::{Category, Classification, Priority, Result, TicketError};

/// Wire shape of the model's answer before enum validation.
#[derive(Debug, Deserialize)]
struct RawClassification {
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    priority: Option<String>,
}

/// Parse raw provider text into a classification.
///
/// Markdown code fences are stripped first. A field outside its
/// enumeration is replaced by that field's default without failing the
/// whole response; unparseable JSON is an error.
pub fn parse_classification(raw: &str) -> Result<Classification> {
    let cleaned = strip_code_fences(raw);

    let parsed: RawClassification = serde_json::from_str(cleaned).map_err(|e| {
        TicketError::LlmApi(format!("Failed to parse classification JSON: {}", e))
    })?;

    let category = match parsed.category.as_deref() {
        Some(value) => Category::parse_or_default(value),
        None => {
            warn!("Classification response missing category, using default");
            Category::default()
        }
    };
    let priority = match parsed.priority.as_deref() {
        Some(value) => Priority::parse_or_default(value),
        None => {
            warn!("Classification response missing priority, using default");
            Priority::default()
        }
    };

    Ok(Classification { category, priority })
}

/// Strip markdown code fences from model output.
///
/// Handles ```json ... ``` and plain ``` ... ``` wrappers; anything else
/// passes through trimmed.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();

    let without_open = if let Some(rest) = trimmed.strip_prefix("```json") {
        rest
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        rest
    } else {
        return trimmed;
    };

    without_open
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json() {
        let result =
            parse_classification(r#"{"category": "billing", "priority": "high"}"#).unwrap();
        assert_eq!(result.category, Category::Billing);
        assert_eq!(result.priority, Priority::High);
    }

    #[test]
    fn test_parse_fenced_json() {
        let raw = "```json\n{\"category\": \"technical\", \"priority\": \"critical\"}\n```";
        let result = parse_classification(raw).unwrap();
        assert_eq!(result.category, Category::Technical);
        assert_eq!(result.priority, Priority::Critical);
    }

    #[test]
    fn test_parse_bare_fences() {
        let raw = "```\n{\"category\": \"account\", \"priority\": \"low\"}\n```";
        let result = parse_classification(raw).unwrap();
        assert_eq!(result.category, Category::Account);
        assert_eq!(result.priority, Priority::Low);
    }

    #[test]
    fn test_out_of_enum_values_substituted_independently() {
        let result =
            parse_classification(r#"{"category": "urgent", "priority": "high"}"#).unwrap();
        assert_eq!(result.category, Category::General);
        assert_eq!(result.priority, Priority::High);

        let result =
            parse_classification(r#"{"category": "billing", "priority": "asap"}"#).unwrap();
        assert_eq!(result.category, Category::Billing);
        assert_eq!(result.priority, Priority::Medium);
    }

    #[test]
    fn test_missing_fields_default() {
        let result = parse_classification(r#"{"category": "billing"}"#).unwrap();
        assert_eq!(result.category, Category::Billing);
        assert_eq!(result.priority, Priority::Medium);

        let result = parse_classification(r#"{}"#).unwrap();
        assert_eq!(result.category, Category::General);
        assert_eq!(result.priority, Priority::Medium);
    }

    #[test]
    fn test_case_insensitive_values() {
        let result =
            parse_classification(r#"{"category": "Billing", "priority": "HIGH"}"#).unwrap();
        assert_eq!(result.category, Category::Billing);
        assert_eq!(result.priority, Priority::High);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(parse_classification("I think this is a billing issue.").is_err());
        assert!(parse_classification("").is_err());
    }

    #[test]
    fn test_strip_code_fences_passthrough() {
        assert_eq!(strip_code_fences("  {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[test]
    fn test_strip_code_fences_unterminated() {
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}"), "{\"a\": 1}");
    }
}

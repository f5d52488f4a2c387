//! Built-in structural detectors.
//!
//! Each detector carries a fixed confidence describing how certain it is
//! about the *shape* of a match, not whether the match is sensitive in
//! context.

use lazy_static::lazy_static;
use regex::Regex;

use super::catalog::RegexPattern;
use crate::types::entity::EntityCategory;

lazy_static! {
    /// Built-in detectors in evaluation order.
    pub static ref BUILTIN_PATTERNS: Vec<RegexPattern> = vec![
        builtin(
            "email",
            r"(?i)\b[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}\b",
            EntityCategory::Pii,
            0.95,
        ),
        // US format: (123) 456-7890, 123-456-7890, 123.456.7890, 1234567890
        builtin(
            "phone",
            r"\b(?:\+?1[-.\s]?)?\(?[0-9]{3}\)?[-.\s]?[0-9]{3}[-.\s]?[0-9]{4}\b",
            EntityCategory::Pii,
            0.85,
        ),
        // +XX XXX XXX XXXX
        builtin(
            "phone_international",
            r"\+[0-9]{1,3}[\s.-]?[0-9]{1,4}[\s.-]?[0-9]{1,4}[\s.-]?[0-9]{1,9}",
            EntityCategory::Pii,
            0.80,
        ),
        // Visa, MasterCard, American Express, Discover
        builtin(
            "credit_card",
            r"\b(?:4[0-9]{12}(?:[0-9]{3})?|5[1-5][0-9]{14}|3[47][0-9]{13}|6(?:011|5[0-9]{2})[0-9]{12})\b",
            EntityCategory::Financial,
            0.90,
        ),
        builtin(
            "credit_card_formatted",
            r"\b(?:4[0-9]{3}|5[1-5][0-9]{2}|3[47][0-9]{2}|6(?:011|5[0-9]{2}))[\s-]?[0-9]{4}[\s-]?[0-9]{4}[\s-]?[0-9]{4}\b",
            EntityCategory::Financial,
            0.90,
        ),
        builtin(
            "ssn",
            r"\b[0-9]{3}[-\s]?[0-9]{2}[-\s]?[0-9]{4}\b",
            EntityCategory::Pii,
            0.85,
        )
        .with_validator(is_valid_ssn),
        builtin(
            "ip_address",
            r"\b(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\b",
            EntityCategory::Pii,
            0.75,
        ),
        builtin(
            "account_number",
            r"(?i)\b(?:account|acct|acc)[\s#:]*[0-9]{8,17}\b",
            EntityCategory::Financial,
            0.70,
        ),
        builtin(
            "iban",
            r"\b[A-Z]{2}[0-9]{2}[A-Z0-9]{4}[0-9]{7}[A-Z0-9]{0,16}\b",
            EntityCategory::Financial,
            0.85,
        ),
        builtin(
            "passport",
            r"(?i)\b(?:passport|pass)[\s#:]*[A-Z0-9]{6,9}\b",
            EntityCategory::Pii,
            0.70,
        ),
    ];
}

fn builtin(name: &str, pattern: &str, category: EntityCategory, confidence: f64) -> RegexPattern {
    let regex = Regex::new(pattern).expect("built-in pattern must compile");
    RegexPattern::new(name, regex, category, confidence)
}

/// Rejects reserved SSN ranges: area 000, 666 and 9xx; group 00; serial 0000.
pub fn is_valid_ssn(candidate: &str) -> bool {
    let digits: String = candidate.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != 9 {
        return false;
    }

    let (area, rest) = digits.split_at(3);
    let (group, serial) = rest.split_at(2);

    area != "000" && area != "666" && !area.starts_with('9') && group != "00" && serial != "0000"
}

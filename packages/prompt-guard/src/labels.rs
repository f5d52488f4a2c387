//! Detector label lookups.
//!
//! Labels come from two places: the ML source (`"phone number"`,
//! `"credit card number"`) and pattern names (`"ip_address"`). Both are
//! normalized and resolved with a two-phase lookup: exact key first, then a
//! scan of the table in declaration order for a key contained in the label or
//! a label contained in the key. The scan order is part of the contract since
//! compound labels can match several keys.

use crate::types::entity::EntityCategory;

/// Labels requested from the ML source by default.
pub const DEFAULT_ML_LABELS: &[&str] = &[
    "person",
    "email",
    "phone number",
    "address",
    "credit card number",
    "social security number",
    "date of birth",
    "passport",
    "driver license",
    "bank account",
    "ip address",
    "medical",
    "organization",
    "location",
];

const CATEGORY_LABELS: &[(&str, EntityCategory)] = &[
    ("person", EntityCategory::Pii),
    ("name", EntityCategory::Pii),
    ("email", EntityCategory::Pii),
    ("phone", EntityCategory::Pii),
    ("phone number", EntityCategory::Pii),
    ("address", EntityCategory::Pii),
    ("location", EntityCategory::Pii),
    ("date of birth", EntityCategory::Pii),
    ("ssn", EntityCategory::Pii),
    ("social security number", EntityCategory::Pii),
    ("passport", EntityCategory::Pii),
    ("driver license", EntityCategory::Pii),
    ("ip address", EntityCategory::Pii),
    ("medical", EntityCategory::Pii),
    ("health", EntityCategory::Pii),
    ("credit card", EntityCategory::Financial),
    ("credit card number", EntityCategory::Financial),
    ("account number", EntityCategory::Financial),
    ("bank account", EntityCategory::Financial),
    ("iban", EntityCategory::Financial),
    ("routing number", EntityCategory::Financial),
    ("amount", EntityCategory::Financial),
    ("money", EntityCategory::Financial),
    ("transaction", EntityCategory::Financial),
    ("contract", EntityCategory::Contract),
    ("agreement", EntityCategory::Contract),
    ("legal", EntityCategory::Contract),
    ("patent", EntityCategory::IntellectualProperty),
    ("trademark", EntityCategory::IntellectualProperty),
    ("copyright", EntityCategory::IntellectualProperty),
    ("trade secret", EntityCategory::IntellectualProperty),
];

const PII_PLACEHOLDERS: &[(&str, &str)] = &[
    ("person", "[PERSON]"),
    ("name", "[NAME]"),
    ("email", "[EMAIL]"),
    ("phone", "[PHONE]"),
    ("phone number", "[PHONE]"),
    ("address", "[ADDRESS]"),
    ("location", "[LOCATION]"),
    ("date of birth", "[DATE_OF_BIRTH]"),
    ("ssn", "[SSN]"),
    ("social security number", "[SSN]"),
    ("passport", "[PASSPORT]"),
    ("driver license", "[DRIVER_LICENSE]"),
    ("ip address", "[IP_ADDRESS]"),
    ("medical", "[MEDICAL_INFO]"),
    ("health", "[MEDICAL_INFO]"),
];

const FINANCIAL_PLACEHOLDERS: &[(&str, &str)] = &[
    ("credit card", "[CREDIT_CARD]"),
    ("credit card number", "[CREDIT_CARD]"),
    ("account number", "[ACCOUNT_NUMBER]"),
    ("bank account", "[ACCOUNT_NUMBER]"),
    ("iban", "[IBAN]"),
    ("routing number", "[ROUTING_NUMBER]"),
    ("amount", "[AMOUNT]"),
    ("money", "[AMOUNT]"),
    ("transaction", "[TRANSACTION]"),
];

const CONTRACT_PLACEHOLDERS: &[(&str, &str)] = &[
    ("contract", "[CONTRACT]"),
    ("agreement", "[AGREEMENT]"),
    ("legal", "[LEGAL_DOCUMENT]"),
];

const IP_PLACEHOLDERS: &[(&str, &str)] = &[
    ("patent", "[PATENT]"),
    ("trademark", "[TRADEMARK]"),
    ("copyright", "[COPYRIGHT]"),
    ("trade secret", "[TRADE_SECRET]"),
];

const CUSTOM_PLACEHOLDERS: &[(&str, &str)] = &[("custom", "[SENSITIVE_DATA]")];

/// Trim, lowercase, and treat `_`/`-` as word separators.
pub fn normalize_label(label: &str) -> String {
    label
        .trim()
        .chars()
        .map(|c| match c {
            '_' | '-' => ' ',
            c => c,
        })
        .collect::<String>()
        .to_lowercase()
}

/// Exact key match, then ordered substring match in either direction.
fn lookup<'a, T: Copy>(table: &'a [(&'a str, T)], label: &str) -> Option<T> {
    let normalized = normalize_label(label);
    if normalized.is_empty() {
        return None;
    }

    if let Some((_, value)) = table.iter().find(|(key, _)| *key == normalized) {
        return Some(*value);
    }

    table
        .iter()
        .find(|(key, _)| normalized.contains(key) || key.contains(normalized.as_str()))
        .map(|(_, value)| *value)
}

/// Category for an ML label, if the label is known.
pub fn category_for_label(label: &str) -> Option<EntityCategory> {
    lookup(CATEGORY_LABELS, label)
}

fn placeholder_table(category: EntityCategory) -> &'static [(&'static str, &'static str)] {
    match category {
        EntityCategory::Pii => PII_PLACEHOLDERS,
        EntityCategory::Financial => FINANCIAL_PLACEHOLDERS,
        EntityCategory::Contract => CONTRACT_PLACEHOLDERS,
        EntityCategory::IntellectualProperty => IP_PLACEHOLDERS,
        EntityCategory::Custom => CUSTOM_PLACEHOLDERS,
    }
}

/// Typed placeholder for `label` within `category`, falling back to the
/// generic category placeholder (`[PII]`, `[FINANCIAL]`, ...).
pub fn placeholder_for(category: EntityCategory, label: &str) -> String {
    lookup(placeholder_table(category), label)
        .map(str::to_string)
        .unwrap_or_else(|| category.fallback_placeholder())
}

//! Name canonicalization: bureau aliases, furnisher grouping keys, and the
//! display-label tables used when composing batch summaries.

/// Placeholder furnisher for actions whose creditor could not be identified.
/// Unlike recipients, an unknown furnisher is still addressable.
pub const UNKNOWN_FURNISHER: &str = "Unknown";

// ---------------------------------------------------------------------------
// Lookup tables
// ---------------------------------------------------------------------------

/// Known recipient spellings, keyed by lowercased trimmed input.
const BUREAU_ALIASES: &[(&str, &str)] = &[
    ("equifax", "Equifax"),
    ("eq", "Equifax"),
    ("efx", "Equifax"),
    ("equifax information services", "Equifax"),
    ("equifax information services llc", "Equifax"),
    ("equifax information services, llc", "Equifax"),
    ("experian", "Experian"),
    ("exp", "Experian"),
    ("xpn", "Experian"),
    ("experian information solutions", "Experian"),
    ("experian information solutions, inc.", "Experian"),
    ("transunion", "TransUnion"),
    ("trans union", "TransUnion"),
    ("tu", "TransUnion"),
    ("tuc", "TransUnion"),
    ("transunion llc", "TransUnion"),
    ("trans union, llc", "TransUnion"),
    ("innovis", "Innovis"),
    ("innovis data solutions", "Innovis"),
];

/// Display labels for the known legal theory tags.
const THEORY_LABELS: &[(&str, &str)] = &[
    ("reinvestigation", "Reinvestigation Demand"),
    ("furnisher_accuracy", "Furnisher Accuracy Dispute"),
    ("obsolete_info", "Obsolete Information Removal"),
    ("identity_theft_block", "Identity Theft Block"),
    ("mixed_file", "Mixed File Correction"),
    ("cross_bureau", "Cross-Bureau Discrepancy"),
    ("procedural", "Procedural Violation Notice"),
];

// ---------------------------------------------------------------------------
// Recipients
// ---------------------------------------------------------------------------

/// Canonical bureau name for a raw recipient string.
///
/// Known aliases (case-insensitive, trimmed) collapse to the fixed
/// vocabulary. Any other non-empty string is title-cased and passed through
/// unchanged so it can still receive mail; only empty input is unresolvable.
pub fn canonical_bureau(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let key = trimmed.to_lowercase();
    for (alias, canonical) in BUREAU_ALIASES {
        if *alias == key {
            return Some((*canonical).to_string());
        }
    }
    Some(title_case(trimmed))
}

// ---------------------------------------------------------------------------
// Furnishers
// ---------------------------------------------------------------------------

/// Normalized furnisher grouping key: trimmed and upper-cased. Absent or
/// empty names become the literal `UNKNOWN_FURNISHER` placeholder.
pub fn normal_furnisher(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_uppercase(),
        _ => UNKNOWN_FURNISHER.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Display labels
// ---------------------------------------------------------------------------

/// Short display label for a theory tag. Unmapped tags fall back to the raw
/// trimmed text rather than erroring, since the vocabulary is open.
pub fn theory_label(tag: &str) -> String {
    let key = tag.trim().to_lowercase();
    for (theory, label) in THEORY_LABELS {
        if *theory == key {
            return (*label).to_string();
        }
    }
    tag.trim().to_string()
}

/// Title-case each whitespace-separated word: "acme collections" becomes
/// "Acme Collections".
pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Turn an enum-like snake_case label into words: "delete_tradeline"
/// becomes "Delete Tradeline".
pub fn humanize_tag(tag: &str) -> String {
    title_case(&tag.replace('_', " "))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

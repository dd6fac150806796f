//! District-name canonicalization.
//!
//! District spelling in the plant table and the district GeoJSON is
//! uncontrolled, so every district comparison in the crate goes through
//! [`district`]. Having exactly one normalizer is load-bearing: the legacy
//! implementations normalized at some call sites and not others, and every
//! "missing data" bug traced back to that divergence.

/// Canonical join key for a raw district spelling: trim, lowercase, then an
/// exact-match table of known variants. Unknown inputs pass through
/// lowercased/trimmed; empty input normalizes to the empty string.
pub fn district(raw: &str) -> String {
    let normalized = raw.trim().to_lowercase();
    match normalized.as_str() {
        "sundergarh" | "sundergarha" | "sondagarh" | "sundargadh" => "sundargarh".to_string(),
        _ => normalized,
    }
}

/// Key a state name to its GeoJSON file: lowercased, whitespace stripped
/// ("Madhya Pradesh" -> "madhyapradesh").
pub fn state_key(name: &str) -> String {
    name.to_lowercase().split_whitespace().collect()
}

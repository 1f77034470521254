use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Channel suffixes appended to entity names upstream, e.g. "Agence Nord - GMB".
    ///
    /// Each entry is anchored at the end of the label and matched case-insensitively.
    /// Order matters only for overlapping variants: the longer spelling comes first.
    static ref SUFFIX_RULES: Vec<(Regex, &'static str)> = vec![
        (suffix(r"google\s+my\s+business"), ""),
        (suffix(r"gmb"), ""),
        (suffix(r"pages\s*jaunes"), ""),
        (suffix(r"pj"), ""),
        (suffix(r"store\s+locator"), ""),
        (suffix(r"autres"), ""),
    ];
}

fn suffix(channel: &str) -> Regex {
    // Patterns are compile-time constants
    Regex::new(&format!(r"(?i)\s*-\s*{}\s*$", channel)).unwrap()
}

/// Strips a known channel suffix from a dimension label.
///
/// Labels without a known suffix come back byte for byte unchanged. The
/// whitespace around a stripped separator goes with the suffix. Stacked
/// suffixes are all removed, which keeps the function idempotent. A label made
/// only of a suffix is left as is.
///
/// # Examples
/// ```
/// use calltrack::labels::normalize_dimension_label;
///
/// assert_eq!(normalize_dimension_label("Agence Centrale - Pages Jaunes"), "Agence Centrale");
/// assert_eq!(normalize_dimension_label("Agence Centrale"), "Agence Centrale");
/// ```
pub fn normalize_dimension_label(raw: &str) -> String {
    let mut label = raw.to_string();

    loop {
        let mut changed = false;
        for (pattern, replacement) in SUFFIX_RULES.iter() {
            let stripped = pattern.replace(&label, *replacement);
            if stripped.trim().is_empty() {
                continue;
            }
            if stripped != label.as_str() {
                label = stripped.into_owned();
                changed = true;
            }
        }
        if !changed {
            return label;
        }
    }
}

//! Text normalization for term lookup.
//!
//! The same normalization is applied when terms are ingested and when
//! mentions are grounded, so that a mention and the term it names meet on a
//! single lookup key:
//! - Unicode NFKC fold
//! - Lowercase conversion
//! - Greek letters spelled out (`α` → `alpha`)
//! - Unicode dash variants unified to `-`
//! - Whitespace collapsing

use unicode_normalization::UnicodeNormalization;

const GREEK_NAMES: &[(char, &str)] = &[
    ('α', "alpha"),
    ('β', "beta"),
    ('γ', "gamma"),
    ('δ', "delta"),
    ('ε', "epsilon"),
    ('ζ', "zeta"),
    ('η', "eta"),
    ('θ', "theta"),
    ('ι', "iota"),
    ('κ', "kappa"),
    ('λ', "lambda"),
    ('μ', "mu"),
    ('ν', "nu"),
    ('ξ', "xi"),
    ('ο', "omicron"),
    ('π', "pi"),
    ('ρ', "rho"),
    ('σ', "sigma"),
    ('ς', "sigma"),
    ('τ', "tau"),
    ('υ', "upsilon"),
    ('φ', "phi"),
    ('χ', "chi"),
    ('ψ', "psi"),
    ('ω', "omega"),
];

fn is_dash(c: char) -> bool {
    matches!(
        c,
        '\u{2010}'..='\u{2015}' | '\u{2212}' | '\u{FE58}' | '\u{FE63}' | '\u{FF0D}'
    )
}

fn greek_name(c: char) -> Option<&'static str> {
    GREEK_NAMES
        .iter()
        .find(|(g, _)| *g == c)
        .map(|(_, name)| *name)
}

/// Normalize text into a term lookup key.
///
/// # Examples
///
/// ```
/// use grounder::normalize::normalize;
///
/// assert_eq!(normalize("  TNF\u{2013}α "), "tnf-alpha");
/// assert_eq!(normalize("Estrogen   Receptor"), "estrogen receptor");
/// ```
#[must_use]
pub fn normalize(s: &str) -> String {
    let folded: String = s.nfkc().collect();
    let mut out = String::with_capacity(folded.len());
    for c in folded.chars().flat_map(char::to_lowercase) {
        if let Some(name) = greek_name(c) {
            out.push_str(name);
        } else if is_dash(c) {
            out.push('-');
        } else {
            out.push(c);
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip a normalized key down to its alphanumeric characters.
///
/// Used as a secondary key so that dash and spacing variants
/// (`IL-6`, `IL 6`, `IL6`) reach the same candidates.
#[must_use]
pub fn squash(norm: &str) -> String {
    norm.chars().filter(|c| c.is_alphanumeric()).collect()
}

/// Candidate singular forms of a normalized key.
///
/// Only the last token is inflected. Returns an empty list when no rule
/// applies.
#[must_use]
pub fn depluralize(norm: &str) -> Vec<String> {
    let (head, last) = match norm.rsplit_once(' ') {
        Some((head, last)) => (Some(head), last),
        None => (None, norm),
    };
    if last.chars().count() < 4 {
        return Vec::new();
    }

    let mut singulars: Vec<String> = Vec::new();
    if let Some(stem) = last.strip_suffix("ies") {
        singulars.push(format!("{stem}y"));
    } else if ["ses", "xes", "ches", "shes"]
        .iter()
        .any(|suffix| last.ends_with(suffix))
    {
        singulars.push(last[..last.len() - 2].to_string());
        singulars.push(last[..last.len() - 1].to_string());
    } else if last.ends_with('s')
        && !["ss", "us", "is"].iter().any(|suffix| last.ends_with(suffix))
    {
        singulars.push(last[..last.len() - 1].to_string());
    }

    singulars
        .into_iter()
        .map(|s| match head {
            Some(head) => format!("{head} {s}"),
            None => s,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_case_and_whitespace() {
        assert_eq!(normalize("  EGFR  "), "egfr");
        assert_eq!(normalize("Epidermal\tgrowth   factor"), "epidermal growth factor");
    }

    #[test]
    fn test_normalize_dashes() {
        assert_eq!(normalize("IL\u{2010}6"), "il-6");
        assert_eq!(normalize("IL\u{2212}6"), "il-6");
        assert_eq!(normalize("IL－6"), "il-6");
    }

    #[test]
    fn test_normalize_greek() {
        assert_eq!(normalize("TNF-α"), "tnf-alpha");
        assert_eq!(normalize("PKCΔ"), "pkcdelta");
        // NFKC maps the micro sign onto the Greek letter.
        assert_eq!(normalize("\u{00B5}-opioid"), "mu-opioid");
    }

    #[test]
    fn test_normalize_full_width() {
        assert_eq!(normalize("ＥＧＦＲ"), "egfr");
    }

    #[test]
    fn test_squash() {
        assert_eq!(squash("il-6"), "il6");
        assert_eq!(squash("il 6"), "il6");
        assert_eq!(squash("tnf-alpha"), "tnfalpha");
    }

    #[test]
    fn test_depluralize() {
        assert_eq!(depluralize("kinases"), vec!["kinas", "kinase"]);
        assert_eq!(depluralize("map kinases"), vec!["map kinas", "map kinase"]);
        assert_eq!(depluralize("antibodies"), vec!["antibody"]);
        assert_eq!(depluralize("receptors"), vec!["receptor"]);
        assert!(depluralize("virus").is_empty());
        assert!(depluralize("mass").is_empty());
        assert!(depluralize("ers").is_empty());
    }
}

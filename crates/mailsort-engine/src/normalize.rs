//! Company-name canonicalization
//!
//! Pure and deterministic: the same raw input always yields the same
//! normalized output, and normalizing twice changes nothing.

use std::collections::BTreeSet;

use lazy_static::lazy_static;
use regex::Regex;

/// Corporate-form suffixes that carry no identity signal
const LEGAL_SUFFIXES: &[&str] = &[
    "inc",
    "incorporated",
    "llc",
    "llp",
    "lp",
    "ltd",
    "limited",
    "corp",
    "corporation",
    "co",
    "company",
    "plc",
    "pc",
    "pllc",
    "gmbh",
    "sa",
    "nv",
    "ag",
];

/// Boilerplate tokens that leak into extracted header lines
const HEADER_NOISE_TOKENS: &[&str] = &[
    "account",
    "statement",
    "statements",
    "monthly",
    "billing",
    "invoice",
    "remittance",
    "advice",
    "attn",
    "attention",
];

lazy_static! {
    static ref NON_ALNUM: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
}

/// Canonicalize a raw company-name candidate for matching
///
/// Lowercases, treats every punctuation run as a separator, drops legal
/// suffixes and header noise, and joins the survivors with single spaces.
/// If filtering would drop every token, the unfiltered tokens are kept so a
/// name like "Statement Co" still normalizes to something comparable.
pub fn normalize(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let tokens: Vec<&str> = NON_ALNUM
        .split(&lowered)
        .filter(|t| !t.is_empty())
        .collect();

    let filtered: Vec<&str> = tokens
        .iter()
        .copied()
        .filter(|t| !LEGAL_SUFFIXES.contains(t) && !HEADER_NOISE_TOKENS.contains(t))
        .collect();

    let kept = if filtered.is_empty() { tokens } else { filtered };
    kept.join(" ")
}

/// Token set of an already-normalized name, for order-independent overlap
pub fn token_set(normalized: &str) -> BTreeSet<&str> {
    normalized.split_whitespace().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_strips_case_punctuation_and_suffix() {
        assert_eq!(normalize("ACME CORP."), "acme");
        assert_eq!(normalize("Acme Corp"), "acme");
        assert_eq!(normalize("Beta, L.L.C."), "beta l l c");
        assert_eq!(normalize("Beta LLC"), "beta");
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(normalize("  Smith   &  Wesson  Inc "), "smith wesson");
    }

    #[test]
    fn test_drops_header_noise_tokens() {
        assert_eq!(normalize("Acme Widgets Account Statement"), "acme widgets");
    }

    #[test]
    fn test_keeps_tokens_when_all_would_be_dropped() {
        assert_eq!(normalize("Statement Co"), "statement co");
        assert_eq!(normalize("Inc"), "inc");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("  ..  "), "");
    }

    #[test]
    fn test_idempotent_on_samples() {
        for raw in [
            "ACME CORP.",
            "Beta LLC",
            "Smith & Wesson, Inc.",
            "Statement Co",
            "café fraîche GmbH",
            "",
        ] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", raw);
        }
    }

    #[test]
    fn test_token_set_is_order_independent() {
        assert_eq!(token_set("john smith"), token_set("smith john"));
    }

    proptest! {
        /// Property: normalize(normalize(x)) == normalize(x)
        #[test]
        fn normalize_idempotent(raw in "\\PC{0,60}") {
            let once = normalize(&raw);
            prop_assert_eq!(normalize(&once), once);
        }

        /// Property: identical input yields identical output
        #[test]
        fn normalize_deterministic(raw in "\\PC{0,60}") {
            prop_assert_eq!(normalize(&raw), normalize(&raw));
        }
    }
}

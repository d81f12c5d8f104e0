//! Statement boundary detection
//!
//! Pages are scanned in source order. A page opens a new statement only when
//! it matches a start-of-statement signature and carries no continuation
//! marker; everything ambiguous is appended to the current statement, so
//! splits are only ever made at clear boundaries.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::EngineError;
use crate::normalize::normalize;
use mailsort_types::{Page, StatementUnit};

/// Default phrases that open a statement
const DEFAULT_START_PATTERNS: &[&str] = &[
    r"(?i)\b(account\s+statement|statement\s+of\s+account|monthly\s+statement|billing\s+statement|remittance\s+advice)\b",
];

/// Default markers of a carried-over page
const DEFAULT_CONTINUATION_PATTERNS: &[&str] = &[
    r"(?i)\bcontinued(\s+(on|from)\s+(next|previous)\s+page)?\b",
    r"(?i)\bpage\s+(?:[2-9]|[1-9]\d+)\s+of\s+\d+\b",
];

lazy_static! {
    /// Header lines that are never the company name
    static ref HEADER_NOISE_LINES: Vec<Regex> = vec![
        Regex::new(r"(?i)^(account\s+statement|statement\s+of\s+account|monthly\s+statement|billing\s+statement|remittance\s+advice)\b").unwrap(),
        Regex::new(r"(?i)^statement\s+(date|period)\b").unwrap(),
        Regex::new(r"(?i)^account\s*(#|no\.?|number)").unwrap(),
        Regex::new(r"(?i)^invoice\b").unwrap(),
        Regex::new(r"(?i)^page\s+\d+(\s+of\s+\d+)?$").unwrap(),
        Regex::new(r"(?i)^continued\b").unwrap(),
        Regex::new(r"^\d{1,2}[/-]\d{1,2}[/-]\d{2,4}$").unwrap(),
        Regex::new(r"(?i)^(january|february|march|april|may|june|july|august|september|october|november|december)\s+\d{1,2},?\s+\d{4}$").unwrap(),
    ];
}

/// Start/continuation predicates the segmenter runs against each page
///
/// Deployments see very different statement layouts, so both signatures are
/// overridable; the defaults cover the common banner phrases.
#[derive(Debug, Clone)]
pub struct SignatureRules {
    start: Vec<Regex>,
    continuation: Vec<Regex>,
}

impl Default for SignatureRules {
    fn default() -> Self {
        Self::new(DEFAULT_START_PATTERNS, DEFAULT_CONTINUATION_PATTERNS)
            .unwrap_or_else(|_| Self {
                start: Vec::new(),
                continuation: Vec::new(),
            })
    }
}

impl SignatureRules {
    /// Compile custom signature patterns
    pub fn new<S: AsRef<str>>(start: &[S], continuation: &[S]) -> Result<Self, EngineError> {
        let compile = |patterns: &[S]| -> Result<Vec<Regex>, EngineError> {
            patterns
                .iter()
                .map(|p| {
                    Regex::new(p.as_ref()).map_err(|e| {
                        EngineError::Configuration(format!("bad signature pattern: {}", e))
                    })
                })
                .collect()
        };
        Ok(Self {
            start: compile(start)?,
            continuation: compile(continuation)?,
        })
    }

    pub fn is_start(&self, text: &str) -> bool {
        self.start.iter().any(|re| re.is_match(text))
    }

    pub fn is_continuation(&self, text: &str) -> bool {
        self.continuation.iter().any(|re| re.is_match(text))
    }
}

/// Partition pages into statement units
///
/// Every input page lands in exactly one unit and order is preserved; the
/// first page always opens the first unit.
pub fn segment_pages(pages: Vec<Page>, rules: &SignatureRules) -> Vec<StatementUnit> {
    let mut groups: Vec<Vec<Page>> = Vec::new();

    for page in pages {
        let starts_new =
            groups.is_empty() || (rules.is_start(&page.text) && !rules.is_continuation(&page.text));
        if starts_new {
            groups.push(vec![page]);
        } else if let Some(current) = groups.last_mut() {
            current.push(page);
        }
    }

    groups
        .into_iter()
        .map(|pages| {
            let company_name = extract_company_name(&pages[0].text);
            let normalized_name = normalize(&company_name);
            StatementUnit {
                pages,
                company_name,
                normalized_name,
            }
        })
        .collect()
}

/// First header line that is not statement boilerplate
fn extract_company_name(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .find(|line| !HEADER_NOISE_LINES.iter().any(|re| re.is_match(line)))
        .unwrap_or("")
        .to_string()
}

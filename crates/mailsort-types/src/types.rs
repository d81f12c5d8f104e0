use serde::{Deserialize, Serialize};

/// Mailing destinations a statement can be routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MailCategory {
    #[serde(rename = "DNM")]
    DoNotMail,
    Foreign,
    NationalSingle,
    NationalMulti,
}

impl MailCategory {
    /// Every category, in output order
    pub const ALL: [MailCategory; 4] = [
        MailCategory::DoNotMail,
        MailCategory::Foreign,
        MailCategory::NationalSingle,
        MailCategory::NationalMulti,
    ];

    /// Stem used for output artifact filenames
    pub fn file_label(&self) -> &'static str {
        match self {
            MailCategory::DoNotMail => "dnm",
            MailCategory::Foreign => "foreign",
            MailCategory::NationalSingle => "national_single",
            MailCategory::NationalMulti => "national_multi",
        }
    }

    /// Human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            MailCategory::DoNotMail => "Do-Not-Mail",
            MailCategory::Foreign => "Foreign",
            MailCategory::NationalSingle => "National-Single",
            MailCategory::NationalMulti => "National-Multi",
        }
    }

    /// Parse an operator-typed category name, case-insensitively
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "dnm" | "donotmail" => Some(MailCategory::DoNotMail),
            "foreign" => Some(MailCategory::Foreign),
            "nationalsingle" | "natiosingle" => Some(MailCategory::NationalSingle),
            "nationalmulti" | "natiomulti" => Some(MailCategory::NationalMulti),
            _ => None,
        }
    }
}

/// One page of the source document, in source order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// 0-based position in the source PDF
    pub index: usize,
    pub text: String,
}

/// A contiguous run of pages believed to belong to one company
///
/// Units partition the page sequence: every source page appears in exactly
/// one unit, and each unit's pages are consecutive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementUnit {
    pub pages: Vec<Page>,
    /// Company name as it appeared in the statement header
    pub company_name: String,
    /// Canonical form used for matching
    pub normalized_name: String,
}

impl StatementUnit {
    /// 0-based source index of the unit's first page
    pub fn first_page(&self) -> usize {
        self.pages.first().map(|p| p.index).unwrap_or(0)
    }

    /// 1-based page numbers, as used by PDF splitting
    pub fn page_numbers(&self) -> Vec<u32> {
        self.pages.iter().map(|p| p.index as u32 + 1).collect()
    }
}

/// One company in the curated reference list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    pub canonical_name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub category: MailCategory,
}

/// A scored reference candidate for one statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub entry: ReferenceEntry,
    /// Similarity in [0, 1]
    pub score: f64,
}

/// Where a statement sits in the categorization state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    /// Scored at or above the threshold; routed without human involvement
    AutoAccepted,
    /// Waiting in the review queue
    PendingReview,
    /// An operator decided its fate
    Resolved,
}

/// Ranked match outcome attached to a statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Descending by score; ties broken by canonical name for determinism
    pub candidates: Vec<MatchCandidate>,
    pub best_score: f64,
    pub status: MatchStatus,
}

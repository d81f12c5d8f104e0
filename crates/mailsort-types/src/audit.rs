//! Per-job audit record for the logging collaborator

use crate::types::MailCategory;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a statement's final disposition was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolutionKind {
    /// Cleared the confidence threshold without human involvement
    Auto,
    /// Operator picked one of the ranked suggestions
    Operator,
    /// Operator supplied a brand-new reference entry
    NewEntry,
    /// Operator routed the statement to the manual bucket
    Rejected,
}

/// One statement's final disposition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Stable statement index, in source order
    pub statement: usize,
    /// Company name as extracted from the statement header
    pub company_name: String,
    /// Canonical name of the matched reference entry, if any
    pub matched_name: Option<String>,
    /// Best similarity score at routing time
    pub score: f64,
    /// 1-based source page numbers
    pub pages: Vec<u32>,
    /// None for statements rejected into the manual bucket
    pub category: Option<MailCategory>,
    pub resolution: ResolutionKind,
}

/// Full audit record for one job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobAudit {
    pub job_id: String,
    pub generated_at: String,
    pub entries: Vec<AuditEntry>,
    /// Statement count per category display name, plus "Manual" for rejects
    pub totals: BTreeMap<String, usize>,
}

impl JobAudit {
    pub fn new(job_id: &str, entries: Vec<AuditEntry>) -> Self {
        let mut totals = BTreeMap::new();
        for entry in &entries {
            let key = match entry.category {
                Some(category) => category.display_name().to_string(),
                None => "Manual".to_string(),
            };
            *totals.entry(key).or_insert(0) += 1;
        }
        Self {
            job_id: job_id.to_string(),
            generated_at: Utc::now().to_rfc3339(),
            entries,
            totals,
        }
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(statement: usize, category: Option<MailCategory>, resolution: ResolutionKind) -> AuditEntry {
        AuditEntry {
            statement,
            company_name: format!("Company {}", statement),
            matched_name: None,
            score: 0.5,
            pages: vec![statement as u32 + 1],
            category,
            resolution,
        }
    }

    #[test]
    fn test_totals_count_categories_and_manual() {
        let audit = JobAudit::new(
            "job-1",
            vec![
                entry(0, Some(MailCategory::DoNotMail), ResolutionKind::Auto),
                entry(1, Some(MailCategory::DoNotMail), ResolutionKind::Operator),
                entry(2, Some(MailCategory::Foreign), ResolutionKind::NewEntry),
                entry(3, None, ResolutionKind::Rejected),
            ],
        );
        assert_eq!(audit.totals.get("Do-Not-Mail"), Some(&2));
        assert_eq!(audit.totals.get("Foreign"), Some(&1));
        assert_eq!(audit.totals.get("Manual"), Some(&1));
        assert_eq!(audit.totals.get("National-Single"), None);
    }

    #[test]
    fn test_json_roundtrip() {
        let audit = JobAudit::new(
            "job-2",
            vec![entry(0, Some(MailCategory::NationalMulti), ResolutionKind::Auto)],
        );
        let json = audit.to_json().unwrap();
        let restored: JobAudit = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.job_id, "job-2");
        assert_eq!(restored.entries.len(), 1);
        assert_eq!(restored.entries[0].resolution, ResolutionKind::Auto);
    }
}

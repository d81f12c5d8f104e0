//! Per-job categorization state machine
//!
//! A job owns one PDF's pages, the routed statements, and a private copy of
//! the reference index. Lifecycle:
//! `Created -> Matching -> (AwaitingReview | Finalizable) -> Finalized`.
//! Finalization is terminal; output artifacts are a pure function of the
//! finalized state.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::matcher::Matcher;
use crate::reference::ReferenceIndex;
use crate::segment::segment_pages;
use mailsort_types::{
    AuditEntry, JobAudit, MailCategory, MatchResult, MatchStatus, Page, ReferenceEntry,
    ResolutionKind, StatementUnit,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Created,
    Matching,
    AwaitingReview,
    Finalizable,
    Finalized,
}

/// One statement with its routing state
#[derive(Debug, Clone)]
pub struct StatementRecord {
    pub unit: StatementUnit,
    pub result: MatchResult,
    /// None while pending, and permanently None for rejected statements
    pub category: Option<MailCategory>,
    pub resolution: Option<ResolutionKind>,
    pub matched_name: Option<String>,
}

pub struct Job {
    id: String,
    pdf: Vec<u8>,
    state: JobState,
    statements: Vec<StatementRecord>,
    pub(crate) index: ReferenceIndex,
    pub(crate) config: EngineConfig,
}

impl Job {
    /// Validate inputs and create an unprocessed job
    pub fn new(
        pdf: Vec<u8>,
        reference: Vec<ReferenceEntry>,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let index = ReferenceIndex::build(reference)?;
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            pdf,
            state: JobState::Created,
            statements: Vec::new(),
            index,
            config,
        })
    }

    /// Extract, segment, and match the job's PDF
    pub fn run(&mut self) -> Result<(), EngineError> {
        self.run_cancellable(&AtomicBool::new(false))
    }

    /// As `run`, but abandons work when the flag flips
    ///
    /// Cancellation is checked between stages and between statements; a
    /// cancelled job never reaches a reviewable or finalizable state.
    pub fn run_cancellable(&mut self, cancel: &AtomicBool) -> Result<(), EngineError> {
        self.state = JobState::Matching;

        let pages = mailsort_pdf::extract_pages(&self.pdf)?;
        if cancel.load(Ordering::Relaxed) {
            return Err(EngineError::Cancelled);
        }

        self.route_pages_cancellable(pages, cancel)
    }

    /// Segment already-extracted pages and route each statement
    pub(crate) fn route_pages_cancellable(
        &mut self,
        pages: Vec<Page>,
        cancel: &AtomicBool,
    ) -> Result<(), EngineError> {
        self.state = JobState::Matching;
        let units = segment_pages(pages, &self.config.signatures);
        if cancel.load(Ordering::Relaxed) {
            return Err(EngineError::Cancelled);
        }

        let matcher = Matcher::new(self.config.token_weight, self.config.edit_weight);
        let mut statements = Vec::with_capacity(units.len());
        for unit in units {
            if cancel.load(Ordering::Relaxed) {
                return Err(EngineError::Cancelled);
            }
            statements.push(route_statement(unit, &matcher, &self.index, &self.config));
        }

        self.statements = statements;
        self.refresh_state();
        tracing::info!(
            job = %self.id,
            statements = self.statements.len(),
            pending = self.pending_count(),
            "job matched"
        );
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn route_pages(&mut self, pages: Vec<Page>) {
        let _ = self.route_pages_cancellable(pages, &AtomicBool::new(false));
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn statements(&self) -> &[StatementRecord] {
        &self.statements
    }

    pub(crate) fn statements_mut(&mut self) -> &mut [StatementRecord] {
        &mut self.statements
    }

    pub fn pending_count(&self) -> usize {
        self.statements
            .iter()
            .filter(|s| s.result.status == MatchStatus::PendingReview)
            .count()
    }

    pub fn resolved_count(&self) -> usize {
        self.statements.len() - self.pending_count()
    }

    /// Recompute AwaitingReview vs Finalizable; never leaves Finalized
    pub(crate) fn refresh_state(&mut self) {
        if self.state == JobState::Finalized {
            return;
        }
        self.state = if self.pending_count() > 0 {
            JobState::AwaitingReview
        } else {
            JobState::Finalizable
        };
    }

    /// Commit the job; terminal and idempotent
    pub fn finalize(&mut self) -> Result<(), EngineError> {
        match self.state {
            JobState::Finalized => Ok(()),
            JobState::Finalizable => {
                self.state = JobState::Finalized;
                tracing::info!(job = %self.id, "job finalized");
                Ok(())
            }
            _ => Err(EngineError::NotFinalizable(self.pending_count())),
        }
    }

    /// 1-based page numbers per category, source order, non-empty only
    pub fn category_pages(&self) -> Vec<(MailCategory, Vec<u32>)> {
        MailCategory::ALL
            .iter()
            .filter_map(|&category| {
                let pages: Vec<u32> = self
                    .statements
                    .iter()
                    .filter(|s| s.category == Some(category))
                    .flat_map(|s| s.unit.page_numbers())
                    .collect();
                if pages.is_empty() {
                    None
                } else {
                    Some((category, pages))
                }
            })
            .collect()
    }

    /// Cut one PDF per non-empty category out of the source document
    ///
    /// Requires a finalized job; re-running yields byte-identical artifacts.
    pub fn build_outputs(&self) -> Result<Vec<(MailCategory, Vec<u8>)>, EngineError> {
        if self.state != JobState::Finalized {
            return Err(EngineError::NotFinalized);
        }
        let mut outputs = Vec::new();
        for (category, pages) in self.category_pages() {
            let bytes = mailsort_pdf::select_pages(&self.pdf, &pages)?;
            outputs.push((category, bytes));
        }
        Ok(outputs)
    }

    /// Audit record for the logging collaborator
    pub fn audit(&self) -> Result<JobAudit, EngineError> {
        if self.state != JobState::Finalized {
            return Err(EngineError::NotFinalized);
        }
        let entries = self
            .statements
            .iter()
            .enumerate()
            .map(|(i, s)| AuditEntry {
                statement: i,
                company_name: s.unit.company_name.clone(),
                matched_name: s.matched_name.clone(),
                score: s.result.best_score,
                pages: s.unit.page_numbers(),
                category: s.category,
                resolution: s.resolution.unwrap_or(ResolutionKind::Rejected),
            })
            .collect();
        Ok(JobAudit::new(&self.id, entries))
    }
}

/// Apply the threshold rule to one freshly matched statement
fn route_statement(
    unit: StatementUnit,
    matcher: &Matcher,
    index: &ReferenceIndex,
    config: &EngineConfig,
) -> StatementRecord {
    let candidates = matcher.rank(&unit.normalized_name, index);
    let best_score = candidates.first().map(|c| c.score).unwrap_or(0.0);

    let accepted = candidates
        .first()
        .filter(|top| top.score >= config.auto_threshold)
        .map(|top| (top.entry.category, top.entry.canonical_name.clone()));

    match accepted {
        Some((category, matched_name)) => StatementRecord {
            category: Some(category),
            matched_name: Some(matched_name),
            resolution: Some(ResolutionKind::Auto),
            result: MatchResult {
                candidates,
                best_score,
                status: MatchStatus::AutoAccepted,
            },
            unit,
        },
        None => StatementRecord {
            category: None,
            matched_name: None,
            resolution: None,
            result: MatchResult {
                candidates,
                best_score,
                status: MatchStatus::PendingReview,
            },
            unit,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pages(texts: &[&str]) -> Vec<Page> {
        texts
            .iter()
            .enumerate()
            .map(|(index, text)| Page {
                index,
                text: text.to_string(),
            })
            .collect()
    }

    fn reference() -> Vec<ReferenceEntry> {
        vec![
            ReferenceEntry {
                canonical_name: "Acme Corp".to_string(),
                aliases: Vec::new(),
                category: MailCategory::DoNotMail,
            },
            ReferenceEntry {
                canonical_name: "Beta LLC".to_string(),
                aliases: Vec::new(),
                category: MailCategory::NationalSingle,
            },
        ]
    }

    fn routed_job(texts: &[&str], config: EngineConfig) -> Job {
        let mut job = Job::new(Vec::new(), reference(), config).unwrap();
        job.route_pages(pages(texts));
        job
    }

    #[test]
    fn test_empty_reference_list_rejected_at_creation() {
        let result = Job::new(Vec::new(), Vec::new(), EngineConfig::default());
        assert!(matches!(result, Err(EngineError::Configuration(_))));
    }

    #[test]
    fn test_bad_threshold_rejected_at_creation() {
        let config = EngineConfig::default().with_auto_threshold(7.0);
        let result = Job::new(Vec::new(), reference(), config);
        assert!(matches!(result, Err(EngineError::Configuration(_))));
    }

    #[test]
    fn test_exact_variant_auto_accepts_and_typo_goes_pending() {
        let job = routed_job(
            &[
                "ACME CORP.\nAccount Statement",
                "Betaa LLC\nAccount Statement",
            ],
            EngineConfig::default(),
        );

        let statements = job.statements();
        assert_eq!(statements.len(), 2);

        assert_eq!(statements[0].result.status, MatchStatus::AutoAccepted);
        assert_eq!(statements[0].category, Some(MailCategory::DoNotMail));
        assert_eq!(statements[0].resolution, Some(ResolutionKind::Auto));

        assert_eq!(statements[1].result.status, MatchStatus::PendingReview);
        assert_eq!(statements[1].category, None);
        assert_eq!(
            statements[1].result.candidates[0].entry.canonical_name,
            "Beta LLC"
        );
        assert_eq!(job.state(), JobState::AwaitingReview);
    }

    #[test]
    fn test_all_auto_accepted_is_finalizable() {
        let job = routed_job(&["ACME CORP.\nAccount Statement"], EngineConfig::default());
        assert_eq!(job.state(), JobState::Finalizable);
    }

    #[test]
    fn test_raising_threshold_never_shrinks_queue() {
        let texts = [
            "ACME CORP.\nAccount Statement",
            "Betaa LLC\nAccount Statement",
            "Totally Unknown Company\nAccount Statement",
        ];
        let mut previous_pending = 0;
        for threshold in [0.0, 0.5, 0.85, 0.99, 1.0] {
            let job = routed_job(
                &texts,
                EngineConfig::default().with_auto_threshold(threshold),
            );
            assert!(
                job.pending_count() >= previous_pending,
                "queue shrank when threshold rose to {}",
                threshold
            );
            previous_pending = job.pending_count();
        }
    }

    #[test]
    fn test_finalize_rejected_while_pending() {
        let mut job = routed_job(&["Betaa LLC\nAccount Statement"], EngineConfig::default());
        assert!(matches!(
            job.finalize(),
            Err(EngineError::NotFinalizable(1))
        ));
        assert_eq!(job.state(), JobState::AwaitingReview);
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let mut job = routed_job(&["ACME CORP.\nAccount Statement"], EngineConfig::default());
        job.finalize().unwrap();
        assert_eq!(job.state(), JobState::Finalized);
        job.finalize().unwrap();
        assert_eq!(job.state(), JobState::Finalized);
    }

    #[test]
    fn test_outputs_require_finalized_job() {
        let job = routed_job(&["ACME CORP.\nAccount Statement"], EngineConfig::default());
        assert!(matches!(job.build_outputs(), Err(EngineError::NotFinalized)));
        assert!(matches!(job.audit(), Err(EngineError::NotFinalized)));
    }

    #[test]
    fn test_category_pages_in_source_order() {
        let mut job = routed_job(
            &[
                "ACME CORP.\nAccount Statement",
                "Beta LLC\nAccount Statement",
                "Acme Corp\nAccount Statement",
            ],
            EngineConfig::default(),
        );
        job.finalize().unwrap();

        let pages = job.category_pages();
        assert_eq!(
            pages,
            vec![
                (MailCategory::DoNotMail, vec![1, 3]),
                (MailCategory::NationalSingle, vec![2]),
            ]
        );
    }

    #[test]
    fn test_custom_signature_rules_drive_segmentation() {
        let rules = crate::segment::SignatureRules::new(
            &[r"(?i)^invoice\b"],
            &[r"(?i)\bcarried\s+forward\b"],
        )
        .unwrap();
        let config = EngineConfig::default().with_signatures(rules);
        let mut job = Job::new(Vec::new(), reference(), config).unwrap();
        job.route_pages(pages(&[
            "INVOICE\nACME CORP",
            "line items, no banner",
            "INVOICE\nBeta LLC",
        ]));

        let statements = job.statements();
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].unit.pages.len(), 2);
        assert_eq!(statements[0].unit.company_name, "ACME CORP");
        assert_eq!(statements[1].unit.company_name, "Beta LLC");
    }

    #[test]
    fn test_cancellation_aborts_matching() {
        let mut job = Job::new(Vec::new(), reference(), EngineConfig::default()).unwrap();
        let cancel = AtomicBool::new(true);
        let result = job.route_pages_cancellable(pages(&["ACME CORP"]), &cancel);
        assert!(matches!(result, Err(EngineError::Cancelled)));
        assert_ne!(job.state(), JobState::Finalizable);
        assert_ne!(job.state(), JobState::AwaitingReview);
    }

    #[test]
    fn test_audit_lists_every_statement() {
        let mut job = routed_job(
            &[
                "ACME CORP.\nAccount Statement",
                "Beta LLC\nAccount Statement",
            ],
            EngineConfig::default(),
        );
        job.finalize().unwrap();
        let audit = job.audit().unwrap();
        assert_eq!(audit.entries.len(), 2);
        assert_eq!(audit.entries[0].resolution, ResolutionKind::Auto);
        assert_eq!(audit.entries[0].matched_name.as_deref(), Some("Acme Corp"));
        assert_eq!(audit.totals.get("Do-Not-Mail"), Some(&1));
        assert_eq!(audit.totals.get("National-Single"), Some(&1));
    }
}

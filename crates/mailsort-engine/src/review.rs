//! Interactive resolution of pending statements
//!
//! The driving collaborator calls `next_pending` / `resolve` one at a time.
//! Protocol errors reject the single offending call and leave the job
//! untouched, so the session stays usable after a bad request.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::job::Job;
use crate::matcher::Matcher;
use crate::normalize::normalize;
use mailsort_types::{MailCategory, MatchCandidate, MatchStatus, ReferenceEntry, ResolutionKind};

/// Operator decision for one pending statement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Decision {
    /// Pick one of the ranked candidates by its canonical name
    Candidate { canonical_name: String },
    /// Introduce a company the reference list does not know yet
    NewEntry {
        name: String,
        category: MailCategory,
    },
    /// Route the statement to the manual bucket
    Reject,
}

/// Presentation view of the oldest pending statement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingReviewItem {
    /// Stable statement id, used by `resolve`
    pub item_id: usize,
    pub company_name: String,
    /// 1-based first page in the source document
    pub first_page: u32,
    /// Top-ranked candidates, truncated to `max_review_suggestions`
    pub suggestions: Vec<MatchCandidate>,
    pub pending_total: usize,
    pub resolved_total: usize,
}

impl Job {
    /// Oldest pending statement in source order, or None when the queue is
    /// empty; read-only
    pub fn next_pending(&self) -> Option<PendingReviewItem> {
        let pending_total = self.pending_count();
        let resolved_total = self.resolved_count();

        self.statements()
            .iter()
            .enumerate()
            .find(|(_, s)| s.result.status == MatchStatus::PendingReview)
            .map(|(item_id, s)| PendingReviewItem {
                item_id,
                company_name: s.unit.company_name.clone(),
                first_page: s.unit.first_page() as u32 + 1,
                suggestions: s
                    .result
                    .candidates
                    .iter()
                    .take(self.config.max_review_suggestions)
                    .cloned()
                    .collect(),
                pending_total,
                resolved_total,
            })
    }

    /// Apply an operator decision to one pending statement
    ///
    /// Fails with `UnknownItem` when the id is not currently pending (which
    /// includes a second resolve of the same item) and `InvalidDecision`
    /// when a candidate decision names an entry outside the item's ranked
    /// list. Both failures leave the job exactly as it was.
    pub fn resolve(&mut self, item_id: usize, decision: Decision) -> Result<(), EngineError> {
        let pending = self
            .statements()
            .get(item_id)
            .map(|s| s.result.status == MatchStatus::PendingReview)
            .unwrap_or(false);
        if !pending {
            return Err(EngineError::UnknownItem(item_id));
        }

        match decision {
            Decision::Candidate { canonical_name } => {
                let chosen = self.statements()[item_id]
                    .result
                    .candidates
                    .iter()
                    .find(|c| c.entry.canonical_name == canonical_name)
                    .map(|c| c.entry.clone());
                let entry = chosen.ok_or_else(|| {
                    EngineError::InvalidDecision(format!(
                        "'{}' is not among the ranked candidates",
                        canonical_name
                    ))
                })?;
                self.mark_resolved(
                    item_id,
                    Some(entry.category),
                    Some(entry.canonical_name),
                    ResolutionKind::Operator,
                );
            }
            Decision::NewEntry { name, category } => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    return Err(EngineError::InvalidDecision(
                        "new entry name must not be empty".to_string(),
                    ));
                }
                // Repeated new-entry decisions for the same company must not
                // pile up duplicate index entries
                if self.index.exact_match(&normalize(&name)).is_none() {
                    self.index.insert(ReferenceEntry {
                        canonical_name: name.clone(),
                        aliases: Vec::new(),
                        category,
                    });
                }
                self.mark_resolved(
                    item_id,
                    Some(category),
                    Some(name),
                    ResolutionKind::NewEntry,
                );
                // The new company may be what later pending statements are
                self.rescore_pending();
            }
            Decision::Reject => {
                self.mark_resolved(item_id, None, None, ResolutionKind::Rejected);
            }
        }

        self.refresh_state();
        Ok(())
    }

    /// Resolve every still-pending statement as rejected; returns the count
    pub fn skip_remaining(&mut self) -> usize {
        let pending: Vec<usize> = self
            .statements()
            .iter()
            .enumerate()
            .filter(|(_, s)| s.result.status == MatchStatus::PendingReview)
            .map(|(i, _)| i)
            .collect();
        for &item_id in &pending {
            self.mark_resolved(item_id, None, None, ResolutionKind::Rejected);
        }
        self.refresh_state();
        pending.len()
    }

    fn mark_resolved(
        &mut self,
        item_id: usize,
        category: Option<MailCategory>,
        matched_name: Option<String>,
        resolution: ResolutionKind,
    ) {
        let record = &mut self.statements_mut()[item_id];
        record.category = category;
        record.matched_name = matched_name;
        record.resolution = Some(resolution);
        record.result.status = MatchStatus::Resolved;
    }

    /// Re-rank pending statements against the job's grown index; any that
    /// now clear the threshold flip to auto-accepted and leave the queue
    fn rescore_pending(&mut self) {
        let matcher = Matcher::new(self.config.token_weight, self.config.edit_weight);
        let threshold = self.config.auto_threshold;

        let rescored: Vec<(usize, Vec<MatchCandidate>)> = self
            .statements()
            .iter()
            .enumerate()
            .filter(|(_, s)| s.result.status == MatchStatus::PendingReview)
            .map(|(i, s)| (i, matcher.rank(&s.unit.normalized_name, &self.index)))
            .collect();

        for (item_id, candidates) in rescored {
            let best_score = candidates.first().map(|c| c.score).unwrap_or(0.0);
            let accepted = candidates
                .first()
                .filter(|top| top.score >= threshold)
                .map(|top| (top.entry.category, top.entry.canonical_name.clone()));

            let record = &mut self.statements_mut()[item_id];
            record.result.candidates = candidates;
            record.result.best_score = best_score;

            if let Some((category, matched_name)) = accepted {
                record.category = Some(category);
                record.matched_name = Some(matched_name);
                record.resolution = Some(ResolutionKind::Auto);
                record.result.status = MatchStatus::AutoAccepted;
                tracing::debug!(item = item_id, score = best_score, "pending item auto-accepted after rescore");
            }
        }
    }
}

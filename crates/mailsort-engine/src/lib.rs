//! Statement segmentation, fuzzy matching, and interactive categorization
//!
//! Takes one statement-run PDF plus a curated company list and routes every
//! statement into a mailing category. High-confidence matches are committed
//! automatically; everything else waits in a review queue until an operator
//! resolves it, after which the job finalizes and per-category PDFs can be
//! cut from the source document.
//!
//! ```no_run
//! use mailsort_engine::{process_job, Decision, EngineConfig};
//! use mailsort_types::{MailCategory, ReferenceEntry};
//!
//! fn example(pdf: Vec<u8>) -> Result<(), mailsort_engine::EngineError> {
//!     let reference = vec![ReferenceEntry {
//!         canonical_name: "Acme Corp".to_string(),
//!         aliases: vec![],
//!         category: MailCategory::DoNotMail,
//!     }];
//!
//!     let mut job = process_job(pdf, reference, EngineConfig::default())?;
//!     while let Some(item) = job.next_pending() {
//!         job.resolve(item.item_id, Decision::Reject)?;
//!     }
//!     job.finalize()?;
//!     for (category, bytes) in job.build_outputs()? {
//!         println!("{}: {} bytes", category.display_name(), bytes.len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod job;
pub mod matcher;
pub mod normalize;
pub mod reference;
pub mod review;
pub mod runner;
pub mod segment;

pub use config::EngineConfig;
pub use error::EngineError;
pub use job::{Job, JobState, StatementRecord};
pub use matcher::{EditSimilarity, Matcher, ScoringStrategy, TokenSetOverlap};
pub use reference::ReferenceIndex;
pub use review::{Decision, PendingReviewItem};
pub use runner::{JobRunner, JobStatus};
pub use segment::SignatureRules;

use mailsort_types::ReferenceEntry;

/// Run the full pipeline for one job: extract, segment, match, route
///
/// Returns a job in `AwaitingReview` or `Finalizable` state. Configuration
/// and reference-list problems fail before any processing; extraction
/// failure aborts the whole job.
pub fn process_job(
    pdf: Vec<u8>,
    reference: Vec<ReferenceEntry>,
    config: EngineConfig,
) -> Result<Job, EngineError> {
    let mut job = Job::new(pdf, reference, config)?;
    job.run()?;
    Ok(job)
}

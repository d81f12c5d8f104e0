//! Mailsort CLI - interactive statement routing
//!
//! Loads a statement-run PDF and a reference list, runs the matching
//! pipeline in the background, walks the operator through the review queue
//! on stdin, then writes one PDF per mailing category plus the audit JSON.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;

use mailsort_engine::{Decision, EngineConfig, Job, JobRunner};
use mailsort_types::{MailCategory, ReferenceEntry};

#[derive(Parser)]
#[command(name = "mailsort", about = "Route statement PDFs into mailing categories")]
struct Cli {
    /// Combined statement-run PDF
    pdf: PathBuf,

    /// Reference list: JSON array of {canonical_name, aliases, category}
    reference: PathBuf,

    /// Directory for the per-category PDFs and the audit record
    #[arg(long, default_value = "results")]
    out_dir: PathBuf,

    /// Minimum score for automatic categorization
    #[arg(long)]
    threshold: Option<f64>,

    /// Ranked candidates shown per pending item
    #[arg(long)]
    suggestions: Option<usize>,

    /// Reject every pending item instead of prompting
    #[arg(long)]
    non_interactive: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("mailsort=info")),
        )
        .init();

    let cli = Cli::parse();

    let pdf = std::fs::read(&cli.pdf)
        .with_context(|| format!("reading PDF {}", cli.pdf.display()))?;
    let reference_json = std::fs::read_to_string(&cli.reference)
        .with_context(|| format!("reading reference list {}", cli.reference.display()))?;
    let reference: Vec<ReferenceEntry> =
        serde_json::from_str(&reference_json).context("parsing reference list")?;

    let mut config = EngineConfig::default();
    if let Some(threshold) = cli.threshold {
        config = config.with_auto_threshold(threshold);
    }
    if let Some(suggestions) = cli.suggestions {
        config = config.with_max_review_suggestions(suggestions);
    }

    let runner = JobRunner::new();
    let id = runner.submit(pdf, reference, config)?;
    info!(job = %id, "processing in background");
    runner.wait(&id).await;

    let mut job = match runner.take(&id) {
        Some(Ok(job)) => job,
        Some(Err(e)) => bail!("job failed: {}", e),
        None => bail!("job {} vanished from the runner", id),
    };

    println!(
        "{} statement(s) found, {} need review",
        job.statements().len(),
        job.pending_count()
    );

    if cli.non_interactive {
        let skipped = job.skip_remaining();
        if skipped > 0 {
            println!("rejected {} unreviewed statement(s)", skipped);
        }
    } else {
        review_loop(&mut job)?;
    }

    job.finalize()?;
    write_results(&job, &cli.out_dir)
}

/// Walk the operator through the pending queue
fn review_loop(job: &mut Job) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    while let Some(item) = job.next_pending() {
        println!();
        println!(
            "[{} left] page {}: \"{}\"",
            item.pending_total, item.first_page, item.company_name
        );
        for (i, candidate) in item.suggestions.iter().enumerate() {
            println!(
                "  {}. {} ({}) - {:.0}%",
                i + 1,
                candidate.entry.canonical_name,
                candidate.entry.category.display_name(),
                candidate.score * 100.0
            );
        }
        println!("  [1-{}] pick  n) new entry  r) reject  s) skip rest  q) quit", item.suggestions.len());
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else { break };
        let input = line?.trim().to_lowercase();

        match input.as_str() {
            "" => continue,
            "q" => bail!("review aborted by operator"),
            "s" => {
                let skipped = job.skip_remaining();
                println!("rejected {} remaining statement(s)", skipped);
                break;
            }
            "r" => {
                job.resolve(item.item_id, Decision::Reject)?;
            }
            "n" => {
                let (name, category) = prompt_new_entry(&mut lines)?;
                match job.resolve(item.item_id, Decision::NewEntry { name, category }) {
                    Ok(()) => {}
                    Err(e) => println!("{}", e),
                }
            }
            other => match other.parse::<usize>() {
                Ok(pick) if (1..=item.suggestions.len()).contains(&pick) => {
                    let canonical_name =
                        item.suggestions[pick - 1].entry.canonical_name.clone();
                    job.resolve(item.item_id, Decision::Candidate { canonical_name })?;
                }
                _ => println!("unrecognized input: {}", other),
            },
        }
    }
    Ok(())
}

fn prompt_new_entry(
    lines: &mut impl Iterator<Item = io::Result<String>>,
) -> Result<(String, MailCategory)> {
    print!("company name: ");
    io::stdout().flush()?;
    let name = match lines.next() {
        Some(line) => line?.trim().to_string(),
        None => bail!("input closed"),
    };

    loop {
        print!("category (dnm / foreign / national-single / national-multi): ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else { bail!("input closed") };
        match MailCategory::parse(&line?) {
            Some(category) => return Ok((name, category)),
            None => println!("unrecognized category"),
        }
    }
}

/// Write per-category PDFs and the audit JSON
fn write_results(job: &Job, out_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    for (category, bytes) in job.build_outputs()? {
        let path = out_dir.join(format!("{}_{}.pdf", job.id(), category.file_label()));
        std::fs::write(&path, bytes)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("wrote {}", path.display());
    }

    let audit = job.audit()?;
    let audit_path = out_dir.join(format!("{}_audit.json", job.id()));
    std::fs::write(&audit_path, audit.to_json()?)
        .with_context(|| format!("writing {}", audit_path.display()))?;
    println!("wrote {}", audit_path.display());

    println!();
    for (label, count) in &audit.totals {
        println!("{:>16}: {}", label, count);
    }
    Ok(())
}

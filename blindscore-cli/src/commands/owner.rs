use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use blindscore_core::he::backends::{MockBackend, RlweBackend};
use blindscore_core::{BackendId, ContextManager, HeBackend};
use blindscore_exchange::{OwnerOutcome, OwnerSession};
use blindscore_storage::BlobStore;
use clap::{Args, Subcommand};
use serde_json::json;

use super::Context;
use crate::input;
use crate::output::{print_info, print_json, print_score, print_success, print_warning};
use crate::secret;

/// Exit code when no score arrives within the poll budget
const EXIT_TIMED_OUT: u8 = 2;

#[derive(Subcommand)]
pub enum OwnerCommand {
    /// Generate keys, publish encrypted transactions, and wait for the score
    Run(RunArgs),
    /// Wait for the score of an already published exchange
    Resume(ResumeArgs),
}

#[derive(Args)]
pub struct RunArgs {
    /// JSON file of the form {"Transactions": [...]}
    #[arg(short, long)]
    pub input: PathBuf,

    /// Where to keep the full context (secret key included)
    #[arg(long, default_value = ".blindscore/owner.ctx")]
    pub secret_file: PathBuf,
}

#[derive(Args)]
pub struct ResumeArgs {
    /// Full context written by `owner run`
    #[arg(long, default_value = ".blindscore/owner.ctx")]
    pub secret_file: PathBuf,
}

pub async fn run(action: OwnerCommand, ctx: &Context) -> Result<ExitCode> {
    let backend_id = ctx.backend_id()?;
    let store = ctx.store().await?;

    match (action, backend_id) {
        (OwnerCommand::Run(args), BackendId::Rlwe) => {
            run_exchange(RlweBackend, store, args, ctx).await
        }
        (OwnerCommand::Run(args), BackendId::Mock) => {
            run_exchange(MockBackend, store, args, ctx).await
        }
        (OwnerCommand::Resume(args), BackendId::Rlwe) => {
            resume(RlweBackend, store, args, ctx).await
        }
        (OwnerCommand::Resume(args), BackendId::Mock) => {
            resume(MockBackend, store, args, ctx).await
        }
    }
}

async fn run_exchange<B: HeBackend>(
    backend: B,
    store: Arc<dyn BlobStore>,
    args: RunArgs,
    ctx: &Context,
) -> Result<ExitCode> {
    let values = input::load(&args.input)?;
    if ctx.verbose && !ctx.json_output {
        print_info(format!(
            "Loaded {} transactions from {}",
            values.len(),
            args.input.display()
        ));
    }

    let mut session = OwnerSession::new(
        backend,
        store,
        &ctx.config.exchange,
        ctx.config.context.clone(),
    );

    session.keygen().context("Key generation failed")?;
    // Must be on disk before anything is published
    secret::write_secret(&args.secret_file, &session.export_full_context()?)?;
    if !ctx.json_output {
        print_success(format!(
            "Context generated, secret saved to {}",
            args.secret_file.display()
        ));
    }

    session.encrypt(&values).context("Encryption failed")?;
    session.publish().await.context("Failed to publish")?;
    if !ctx.json_output {
        print_success(format!(
            "Published encrypted input to bucket '{}'",
            ctx.config.exchange.bucket
        ));
        print_info("Waiting for the compute party...");
    }

    let outcome = session.await_result().await?;
    report(outcome, &args.secret_file, ctx)
}

async fn resume<B: HeBackend>(
    backend: B,
    store: Arc<dyn BlobStore>,
    args: ResumeArgs,
    ctx: &Context,
) -> Result<ExitCode> {
    let text = secret::read_secret(&args.secret_file)?;
    let full = ContextManager::new(backend.clone())
        .from_text(&text)
        .and_then(|c| c.into_full())
        .with_context(|| format!("{} does not hold a full context", args.secret_file.display()))?;

    let mut session = OwnerSession::resume(backend, store, &ctx.config.exchange, full);
    if !ctx.json_output {
        print_info("Waiting for the compute party...");
    }

    let outcome = session.await_result().await?;
    report(outcome, &args.secret_file, ctx)
}

fn report(outcome: OwnerOutcome, secret_file: &Path, ctx: &Context) -> Result<ExitCode> {
    match outcome {
        OwnerOutcome::Decrypted(score) => {
            if ctx.json_output {
                print_json(&json!({
                    "status": "decrypted",
                    "score": score.value,
                    "raw": score.raw,
                    "band": score.band,
                    "verdict": score.band.verdict(),
                }))?;
            } else {
                print_score(&score);
            }
            Ok(ExitCode::SUCCESS)
        }
        OwnerOutcome::TimedOut { attempts } => {
            if ctx.json_output {
                print_json(&json!({
                    "status": "timed_out",
                    "attempts": attempts,
                }))?;
            } else {
                print_warning(format!("No score after {attempts} attempts"));
                print_info(format!(
                    "Run `blindscore owner resume --secret-file {}` to keep waiting",
                    secret_file.display()
                ));
            }
            Ok(ExitCode::from(EXIT_TIMED_OUT))
        }
    }
}

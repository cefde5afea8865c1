use std::sync::Arc;

use anyhow::{Context as _, Result};
use blindscore_core::he::backends::{MockBackend, RlweBackend};
use blindscore_core::{BackendId, HeBackend, ScoringModel};
use blindscore_exchange::ComputeParty;
use blindscore_storage::BlobStore;
use clap::Args;
use colored::Colorize;

use super::Context;
use crate::output::{print_json, print_success};

#[derive(Args)]
pub struct ComputeArgs {
    /// Use the built-in model even if the config file defines one
    #[arg(long)]
    pub builtin_model: bool,
}

pub async fn run(args: ComputeArgs, ctx: &Context) -> Result<()> {
    let model = match (&ctx.config.model, args.builtin_model) {
        (Some(model), false) => model.clone(),
        _ => ScoringModel::builtin(),
    };

    let store = ctx.store().await?;
    match ctx.backend_id()? {
        BackendId::Rlwe => score(RlweBackend, store, model, ctx).await,
        BackendId::Mock => score(MockBackend, store, model, ctx).await,
    }
}

async fn score<B: HeBackend>(
    backend: B,
    store: Arc<dyn BlobStore>,
    model: ScoringModel,
    ctx: &Context,
) -> Result<()> {
    let mut party = ComputeParty::new(backend, store, &ctx.config.exchange, model)?;
    let report = party.run().await.context("Scoring failed")?;

    if ctx.json_output {
        print_json(&report)?;
    } else {
        print_success("Encrypted score published");
        println!("  {}: {}", "Model".dimmed(), report.model_version);
        println!("  {}: {}", "Input slots".dimmed(), report.input_slots);
        println!(
            "  {}: {}/{}",
            "Location".dimmed(),
            report.bucket,
            report.published_key
        );
    }

    Ok(())
}

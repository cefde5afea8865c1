use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use super::Context;
use crate::output::print_json;

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration (file plus environment)
    Show,
}

pub fn run(action: ConfigCommand, ctx: &Context) -> Result<()> {
    match action {
        ConfigCommand::Show => show(ctx),
    }
}

fn show(ctx: &Context) -> Result<()> {
    if ctx.json_output {
        return print_json(&ctx.config);
    }

    println!("{}", "Configuration:".bold());
    print!("{}", toml::to_string_pretty(&ctx.config)?);

    println!();
    println!("{}", "Overrides:".dimmed());
    println!(
        "  {}",
        "blindscore.toml, --config <file>, or BLINDSCORE_<SECTION>__<KEY>".bright_black()
    );

    Ok(())
}

// Output formatting helpers

use blindscore_core::{RiskBand, RiskScore};
use colored::Colorize;
use serde::Serialize;
use std::fmt::Display;

pub fn print_json<T: Serialize>(data: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    println!("{json}");
    Ok(())
}

pub fn print_success(message: impl Display) {
    println!("{} {}", "✓".green(), message);
}

pub fn print_warning(message: impl Display) {
    eprintln!("{} {}", "!".yellow(), message);
}

pub fn print_info(message: impl Display) {
    println!("{} {}", "ℹ".blue(), message);
}

pub fn print_score(score: &RiskScore) {
    let value = format!("{}/100", score.value);
    let band = score.band.to_string();
    let (value, band) = match score.band {
        RiskBand::Low => (value.green(), band.green()),
        RiskBand::Suspicious => (value.yellow(), band.yellow()),
        RiskBand::High => (value.red(), band.red()),
    };

    println!("{} {} ({})", "Fraud risk:".bold(), value.bold(), band);
    println!("  {}", score.band.verdict());
}

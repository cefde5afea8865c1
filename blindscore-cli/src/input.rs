//! Owner input file: {"Transactions": [f64, ...]}

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct TransactionFile {
    #[serde(rename = "Transactions")]
    transactions: Vec<f64>,
}

pub fn parse(json: &str) -> Result<Vec<f64>> {
    let file: TransactionFile =
        serde_json::from_str(json).context("Expected {\"Transactions\": [numbers...]}")?;
    if file.transactions.is_empty() {
        anyhow::bail!("Transaction list is empty");
    }
    Ok(file.transactions)
}

pub fn load(path: &Path) -> Result<Vec<f64>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse(&json).with_context(|| format!("Invalid input file {}", path.display()))
}

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use indicatif::ProgressBar;
use kibom_csv::{BomRow, MatchMethod, Pricing, read_bom, write_bom};
use kibom_mouser::MouserClient;

use crate::lookup::{PartLookup, PartSearch};

#[derive(Args, Debug, Clone)]
pub struct PriceArgs {
    /// KiCad BOM CSV to price
    #[arg(value_name = "INPUT_BOM", value_hint = clap::ValueHint::FilePath)]
    pub input: PathBuf,

    /// Annotated output CSV
    #[arg(
        value_name = "OUTPUT_BOM",
        value_hint = clap::ValueHint::FilePath,
        default_value = "bom_with_prices.csv"
    )]
    pub output: PathBuf,
}

pub fn execute(args: PriceArgs) -> Result<()> {
    // Credential check comes first: a missing key aborts before any file
    // is read or written.
    let client = MouserClient::from_env()?;

    let bom = read_bom(&args.input)
        .with_context(|| format!("failed to read BOM '{}'", args.input.display()))?;

    // Show progress during the per-row API calls
    let spinner = ProgressBar::new_spinner();
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let total = bom.rows.len();
    let mut current = 0usize;
    let (pricing, summary) = price_rows(client, &bom.rows, |reference| {
        current += 1;
        spinner.set_message(format!("Pricing {reference} ({current}/{total})"));
    });
    spinner.finish_and_clear();

    write_bom(&args.output, &bom, &pricing)
        .with_context(|| format!("failed to write '{}'", args.output.display()))?;

    summary.print(&args.output);
    Ok(())
}

fn price_rows<S: PartSearch>(
    backend: S,
    rows: &[BomRow],
    mut on_row: impl FnMut(&str),
) -> (Vec<Pricing>, Summary) {
    let mut lookup = PartLookup::new(backend);
    let mut summary = Summary::default();

    let pricing = rows
        .iter()
        .map(|row| {
            on_row(&row.reference);
            let result = lookup.price_row(row);
            summary.record(&result);
            result
        })
        .collect();

    (pricing, summary)
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Summary {
    by_mpn: usize,
    by_keyword: usize,
    not_found: usize,
}

impl Summary {
    fn record(&mut self, pricing: &Pricing) {
        match pricing {
            Pricing::Found {
                via: MatchMethod::Mpn,
                ..
            } => self.by_mpn += 1,
            Pricing::Found {
                via: MatchMethod::Keyword,
                ..
            } => self.by_keyword += 1,
            Pricing::NotFound => self.not_found += 1,
        }
    }

    fn print(&self, output: &Path) {
        println!("{}", "✓ BOM pricing complete".green().bold());
        println!("  Found by MPN:     {}", self.by_mpn);
        println!("  Found by keyword: {}", self.by_keyword);
        if self.not_found > 0 {
            println!("  Not found:        {}", self.not_found.to_string().yellow());
        } else {
            println!("  Not found:        0");
        }
        println!("  Output: {}", output.display().to_string().bold());
    }
}

//! # Outline Subcommand
//!
//! Validate a draft file and render its will outline as plain text.
//! Nothing is rendered for an invalid draft.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use testament_schema::validate_draft;
use testament_state::{DocumentAssembler, OutlineAssembler};

/// Arguments for the `testament outline` subcommand.
#[derive(Args, Debug)]
pub struct OutlineArgs {
    /// Draft file (JSON or YAML).
    #[arg(value_name = "FILE")]
    pub path: PathBuf,

    /// Reference date for ages, YYYY-MM-DD. Defaults to today (UTC).
    #[arg(long)]
    pub today: Option<String>,

    /// Write the outline here instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Execute the outline subcommand. Returns 0 when an outline was produced.
pub fn run_outline(args: &OutlineArgs) -> Result<u8> {
    let draft = crate::load_draft(&args.path)?;
    let ctx = crate::context_for(args.today.as_deref())?;

    let validated = match validate_draft(&draft, &ctx) {
        Ok(validated) => validated,
        Err(errors) => {
            println!(
                "FAIL: {} is not ready for an outline ({} error(s))",
                args.path.display(),
                errors.len()
            );
            for error in &errors {
                println!("  {error}");
            }
            return Ok(1);
        }
    };

    let document = OutlineAssembler
        .assemble(&validated)
        .context("failed to assemble outline")?;
    let text = document.render_text();

    match &args.output {
        Some(out) => {
            std::fs::write(out, &text)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Wrote outline to {} ({})", out.display(), document.digest);
        }
        None => print!("{text}"),
    }
    tracing::info!(will = %document.will_id, digest = %document.digest, "outline assembled");
    Ok(0)
}

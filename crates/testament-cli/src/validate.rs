//! # Validate Subcommand
//!
//! Validate a draft file as a whole, or a single step of it. Errors are
//! printed one per line in the order the wizard would focus them.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use clap::Args;
use testament_core::{FieldError, StepKey};
use testament_schema::{first_invalid_in_plan, validate_draft, validate_step, StepDefinition, WillDraft};

/// Arguments for the `testament validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Draft file (JSON or YAML).
    #[arg(value_name = "FILE")]
    pub path: PathBuf,

    /// Validate only this step, e.g. `testator`.
    #[arg(long)]
    pub step: Option<String>,

    /// Reference date for ages, YYYY-MM-DD. Defaults to today (UTC).
    #[arg(long)]
    pub today: Option<String>,

    /// Print errors as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Execute the validate subcommand. Returns 0 when valid, 1 otherwise.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let draft = crate::load_draft(&args.path)?;
    let ctx = crate::context_for(args.today.as_deref())?;

    let (errors, first) = match args.step.as_deref() {
        Some(raw) => {
            let step = StepKey::from_str(raw).context("--step")?;
            check_step(&draft, step, &ctx)?
        }
        None => match validate_draft(&draft, &ctx) {
            Ok(_) => (Vec::new(), None),
            Err(errors) => {
                let first = first_invalid_in_plan(draft.will_type, &errors).cloned();
                (errors, first)
            }
        },
    };

    tracing::info!(
        will = %draft.id,
        today = %ctx.today,
        errors = errors.len(),
        "validated draft"
    );

    if args.json {
        let report = serde_json::json!({
            "valid": errors.is_empty(),
            "errors": errors,
            "firstInvalidField": first,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&args.path, &errors, first.as_ref());
    }

    Ok(u8::from(!errors.is_empty()))
}

fn check_step(
    draft: &WillDraft,
    step: StepKey,
    ctx: &testament_schema::ValidationContext,
) -> Result<(Vec<FieldError>, Option<FieldError>)> {
    if !draft.will_type.includes(step) {
        bail!("step {step} is not part of a {} will", draft.will_type);
    }
    let mut normalized = draft.clone();
    testament_schema::normalize(&mut normalized, ctx.today);
    let errors = validate_step(step, normalized.section(step), ctx);
    let first = StepDefinition::of(step).first_invalid(&errors).cloned();
    Ok((errors, first))
}

fn print_report(path: &std::path::Path, errors: &[FieldError], first: Option<&FieldError>) {
    if errors.is_empty() {
        println!("PASS: {}", path.display());
        return;
    }
    println!("FAIL: {} ({} error(s))", path.display(), errors.len());
    for error in errors {
        println!("  {error}");
    }
    if let Some(first) = first {
        println!("First invalid field: {}.{}", first.step, first.path);
    }
}

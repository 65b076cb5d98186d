//! # Steps Subcommand
//!
//! Print the ordered step plan for a will type.

use std::str::FromStr;

use anyhow::{Context, Result};
use clap::Args;
use testament_core::WillType;
use testament_schema::step_plan;

/// Arguments for the `testament steps` subcommand.
#[derive(Args, Debug)]
pub struct StepsArgs {
    /// `simple` or `comprehensive`.
    #[arg(long, default_value = "simple")]
    pub will_type: String,

    /// Also list each step's declared fields.
    #[arg(long)]
    pub fields: bool,
}

/// Render the plan as text lines.
pub fn plan_lines(will_type: WillType, with_fields: bool) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, def) in step_plan(will_type).iter().enumerate() {
        lines.push(format!("{:>2}. {:<18} {}", i + 1, def.key.as_str(), def.title));
        if with_fields {
            lines.extend(def.fields.iter().map(|f| format!("      {f}")));
        }
    }
    lines
}

/// Execute the steps subcommand.
pub fn run_steps(args: &StepsArgs) -> Result<u8> {
    let will_type = WillType::from_str(&args.will_type).context("--will-type")?;
    println!("{} will: {} steps", will_type, will_type.step_count());
    for line in plan_lines(will_type, args.fields) {
        println!("{line}");
    }
    Ok(0)
}

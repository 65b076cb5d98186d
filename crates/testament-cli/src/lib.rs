//! # testament-cli: Command Line Tools for Will Drafts
//!
//! Provides the `testament` binary for working with draft files outside the
//! wizard.
//!
//! ## Subcommands
//!
//! - `testament validate <FILE> [--step KEY] [--today DATE]`: validate a
//!   whole draft, or one step of it.
//! - `testament outline <FILE> [--today DATE] [--output PATH]`: validate,
//!   then print or write the will outline.
//! - `testament steps [--will-type TYPE]`: print the step plan.
//!
//! ## Draft Files
//!
//! JSON or YAML. Either a full stored draft (with `id`, `owner`,
//! `createdAt`) or just `willType` and `sections`:
//!
//! ```yaml
//! willType: simple
//! sections:
//!   testator:
//!     fullName: Ravi Shankar Kumar
//! ```
//!
//! ## Exit Codes
//!
//! 0 on success, 1 when the draft is invalid or the command fails.

pub mod outline;
pub mod steps;
pub mod validate;

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use testament_core::{parse_date, OwnerId, StepKey, WillType};
use testament_schema::{ValidationContext, WillDraft};

/// A draft file without stored identity.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SectionsOnly {
    #[serde(default)]
    will_type: WillType,
    #[serde(default)]
    sections: BTreeMap<StepKey, Value>,
}

/// Read a draft from a JSON or YAML file.
///
/// Files ending in `.json` are parsed as JSON; everything else as YAML.
/// A document without an `id` gets a fresh owner and will id.
pub fn load_draft(path: &Path) -> Result<WillDraft> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let value: Value = if is_json {
        serde_json::from_str(&text)
            .with_context(|| format!("{} is not valid JSON", path.display()))?
    } else {
        serde_yaml::from_str(&text)
            .with_context(|| format!("{} is not valid YAML", path.display()))?
    };

    if value.get("id").is_some() {
        return serde_json::from_value(value)
            .with_context(|| format!("{} is not a stored will draft", path.display()));
    }

    let parsed: SectionsOnly = serde_json::from_value(value)
        .with_context(|| format!("{} does not hold willType and sections", path.display()))?;
    tracing::debug!(path = %path.display(), "draft file has no id, assigning one");
    let mut draft = WillDraft::new(OwnerId::new(), parsed.will_type);
    for (step, payload) in parsed.sections {
        draft.set_section(step, payload);
    }
    Ok(draft)
}

/// Validation context for an optional `--today` override.
pub fn context_for(today: Option<&str>) -> Result<ValidationContext> {
    match today {
        Some(raw) => {
            let date = parse_date(raw).context("--today must be YYYY-MM-DD")?;
            Ok(ValidationContext::new(date))
        }
        None => Ok(ValidationContext::current()),
    }
}
